use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use super::cache::{CacheKey, QueryCache};
use super::error::ClientError;
use super::notify::{Notification, Notifier};
use super::resource::Resource;
use super::store::RemoteStore;

/// Runs a request against an optimistically updated cache entry.
#[derive(Clone)]
pub struct OptimisticExecutor {
    notifier: Arc<dyn Notifier>,
}

impl OptimisticExecutor {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Write the value `predict` derives from the cached one, then await
    /// `request`. On success the key is invalidated so the caller can
    /// refetch. On failure the snapshot is restored and an error is
    /// notified; if a newer write superseded this one, the key is left
    /// stale and the notification is informational.
    pub async fn execute<V, T, P, Fut>(
        &self,
        cache: &QueryCache<V>,
        key: &CacheKey,
        action: &str,
        predict: P,
        request: Fut,
    ) -> Result<T, ClientError>
    where
        V: Clone,
        P: FnOnce(Option<&V>) -> Option<V>,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let (snapshot, generation) = cache.apply(key, predict).await;

        match request.await {
            Ok(result) => {
                cache.invalidate(key).await;
                Ok(result)
            }
            Err(err) => {
                let title = format!("Could not {}", action);
                if cache.rollback(key, generation, snapshot).await {
                    warn!("Could not {} ({}); restored previous value", action, key);
                    self.notifier.notify(Notification::error(title, err.to_string()));
                } else {
                    // the newer write owns the entry; it is reloaded on next read
                    warn!("Could not {} ({}); newer change pending, marked stale", action, key);
                    self.notifier.notify(Notification::info(
                        title,
                        format!("{}. Newer changes are kept and will be reloaded.", err),
                    ));
                }
                Err(err)
            }
        }
    }
}

/// Cached, optimistically mutated access to one resource kind of a project.
pub struct ResourceClient<R: Resource, S: ?Sized> {
    project_id: Uuid,
    store: Arc<S>,
    cache: QueryCache<Vec<R::Record>>,
    executor: OptimisticExecutor,
}

impl<R: Resource, S: ?Sized> Clone for ResourceClient<R, S> {
    fn clone(&self) -> Self {
        Self {
            project_id: self.project_id,
            store: Arc::clone(&self.store),
            cache: self.cache.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<R, S> ResourceClient<R, S>
where
    R: Resource,
    S: RemoteStore<R> + ?Sized,
{
    pub fn new(
        project_id: Uuid,
        store: Arc<S>,
        cache: QueryCache<Vec<R::Record>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            project_id,
            store,
            cache,
            executor: OptimisticExecutor::new(notifier),
        }
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.project_id, R::PATH)
    }

    pub fn cache(&self) -> &QueryCache<Vec<R::Record>> {
        &self.cache
    }

    /// Whatever the cache holds right now, fetched or predicted.
    pub async fn cached(&self) -> Vec<R::Record> {
        self.cache.get(&self.key()).await.unwrap_or_default()
    }

    /// Load from the server. The result is only cached if no newer fetch or
    /// mutation started meanwhile.
    pub async fn fetch(&self) -> Result<Vec<R::Record>, ClientError> {
        let key = self.key();
        let generation = self.cache.begin(&key).await;
        let records = self.store.list(self.project_id).await?;

        if !self.cache.resolve(&key, generation, records.clone()).await {
            debug!("Discarded superseded fetch of {}", key);
        }
        Ok(records)
    }

    /// Cached records, fetching first when missing or stale.
    pub async fn records(&self) -> Result<Vec<R::Record>, ClientError> {
        let key = self.key();
        if !self.cache.is_stale(&key).await {
            if let Some(records) = self.cache.get(&key).await {
                return Ok(records);
            }
        }
        self.fetch().await
    }

    pub async fn create(&self, input: R::Create) -> Result<R::Record, ClientError> {
        let project_id = self.project_id;
        let predicted = R::predict_create(project_id, &input);

        let record = self
            .executor
            .execute(
                &self.cache,
                &self.key(),
                &format!("create {}", R::NAME),
                move |current| {
                    let mut records = current.cloned().unwrap_or_default();
                    R::insert_predicted(&mut records, predicted);
                    Some(records)
                },
                self.store.create(project_id, &input),
            )
            .await?;

        self.refresh().await;
        Ok(record)
    }

    pub async fn update(&self, id: Uuid, patch: R::Patch) -> Result<R::Record, ClientError> {
        let record = self
            .executor
            .execute(
                &self.cache,
                &self.key(),
                &format!("update {}", R::NAME),
                |current| {
                    let mut records = current?.clone();
                    let record = records.iter_mut().find(|record| R::id(record) == id)?;
                    R::apply_patch(record, &patch);
                    Some(records)
                },
                self.store.update(self.project_id, id, &patch),
            )
            .await?;

        self.refresh().await;
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.executor
            .execute(
                &self.cache,
                &self.key(),
                &format!("delete {}", R::NAME),
                |current| {
                    let mut records = current?.clone();
                    records.retain(|record| R::id(record) != id);
                    Some(records)
                },
                self.store.delete(self.project_id, id),
            )
            .await?;

        self.refresh().await;
        Ok(())
    }

    /// Reconcile after a successful mutation. A failed refetch leaves the
    /// key stale for the next read.
    async fn refresh(&self) {
        if let Err(err) = self.fetch().await {
            warn!("Refetch of {} failed: {}", self.key(), err);
        }
    }
}

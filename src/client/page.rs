//! Page-level view model for one planning block.
//!
//! A [`PlanPage`] owns the cached collections a block page reads from,
//! routes every change through the optimistic executor, and derives the
//! completion figures from the cache with the same rules the server uses.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use strum::IntoEnumIterator;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::cache::{CacheEvent, CacheKey, QueryCache};
use super::error::ClientError;
use super::mutation::{OptimisticExecutor, ResourceClient};
use super::notify::Notifier;
use super::resource::{Heuristics, Policies, Ratings, Tasks};
use super::store::{HttpStore, PlanApi, RemoteStore};
use crate::database::entities::{
    plans, project_tasks, success_factor_ratings, success_factors,
};
use crate::domain::{BlockId, TaskStage};
use crate::services::{
    block_fields, normalize_heuristics, BlockProgress, FrameworkSelectionResponse, PlanState,
    ProjectProgress, UpsertRating, PERSONAL_HEURISTICS_KEY,
};

const PLAN_KEY: &str = "plan";
const FACTORS_KEY: &str = "success-factors";
const SELECTION_KEY: &str = "framework-selection";

/// Remote stores for the collections a page works with.
pub struct PlanStores {
    pub ratings: Arc<dyn RemoteStore<Ratings>>,
    pub heuristics: Arc<dyn RemoteStore<Heuristics>>,
    pub tasks: Arc<dyn RemoteStore<Tasks>>,
    pub policies: Arc<dyn RemoteStore<Policies>>,
}

impl PlanStores {
    pub fn http(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            ratings: Arc::new(HttpStore::<Ratings>::with_client(client.clone(), base_url)),
            heuristics: Arc::new(HttpStore::<Heuristics>::with_client(client.clone(), base_url)),
            tasks: Arc::new(HttpStore::<Tasks>::with_client(client.clone(), base_url)),
            policies: Arc::new(HttpStore::<Policies>::with_client(client, base_url)),
        }
    }
}

/// What a block page renders.
#[derive(Debug, Clone)]
pub struct BlockView {
    pub block: BlockId,
    pub fields: Map<String, Value>,
    pub progress: BlockProgress,
}

pub struct PlanPage {
    project_id: Uuid,
    api: PlanApi,
    events: broadcast::Sender<CacheEvent>,
    executor: OptimisticExecutor,
    plan: QueryCache<plans::Model>,
    factors: QueryCache<Vec<success_factors::Model>>,
    selection: QueryCache<FrameworkSelectionResponse>,
    pub ratings: ResourceClient<Ratings, dyn RemoteStore<Ratings>>,
    pub heuristics: ResourceClient<Heuristics, dyn RemoteStore<Heuristics>>,
    pub tasks: ResourceClient<Tasks, dyn RemoteStore<Tasks>>,
    pub policies: ResourceClient<Policies, dyn RemoteStore<Policies>>,
}

impl PlanPage {
    /// Page backed by the REST API at `base_url`.
    pub fn connect(base_url: &str, project_id: Uuid, notifier: Arc<dyn Notifier>) -> Self {
        let client = reqwest::Client::new();
        Self::new(
            project_id,
            PlanApi::with_client(client.clone(), base_url),
            PlanStores::http(client, base_url),
            notifier,
        )
    }

    pub fn new(
        project_id: Uuid,
        api: PlanApi,
        stores: PlanStores,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = broadcast::channel(256);

        Self {
            project_id,
            api,
            executor: OptimisticExecutor::new(Arc::clone(&notifier)),
            plan: QueryCache::with_events(events.clone()),
            factors: QueryCache::with_events(events.clone()),
            selection: QueryCache::with_events(events.clone()),
            ratings: ResourceClient::new(
                project_id,
                stores.ratings,
                QueryCache::with_events(events.clone()),
                Arc::clone(&notifier),
            ),
            heuristics: ResourceClient::new(
                project_id,
                stores.heuristics,
                QueryCache::with_events(events.clone()),
                Arc::clone(&notifier),
            ),
            tasks: ResourceClient::new(
                project_id,
                stores.tasks,
                QueryCache::with_events(events.clone()),
                Arc::clone(&notifier),
            ),
            policies: ResourceClient::new(
                project_id,
                stores.policies,
                QueryCache::with_events(events.clone()),
                notifier,
            ),
            events,
        }
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    /// One receiver for changes to any collection of the page.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    fn key(&self, resource: &'static str) -> CacheKey {
        CacheKey::new(self.project_id, resource)
    }

    /// Fetch everything the page shows.
    pub async fn load(&self) -> Result<(), ClientError> {
        tokio::try_join!(
            self.fetch_plan(),
            self.fetch_factors(),
            self.fetch_selection(),
            self.ratings.fetch(),
            self.heuristics.fetch(),
            self.tasks.fetch(),
            self.policies.fetch(),
        )?;
        Ok(())
    }

    async fn fetch_plan(&self) -> Result<plans::Model, ClientError> {
        let key = self.key(PLAN_KEY);
        let generation = self.plan.begin(&key).await;
        let plan = self.api.plan(self.project_id).await?;
        self.plan.resolve(&key, generation, plan.clone()).await;
        Ok(plan)
    }

    async fn fetch_factors(&self) -> Result<Vec<success_factors::Model>, ClientError> {
        let key = self.key(FACTORS_KEY);
        let generation = self.factors.begin(&key).await;
        let factors = self.api.success_factors().await?;
        self.factors.resolve(&key, generation, factors.clone()).await;
        Ok(factors)
    }

    async fn fetch_selection(&self) -> Result<FrameworkSelectionResponse, ClientError> {
        let key = self.key(SELECTION_KEY);
        let generation = self.selection.begin(&key).await;
        let selection = self.api.framework_selection(self.project_id).await?;
        self.selection
            .resolve(&key, generation, selection.clone())
            .await;
        Ok(selection)
    }

    /// Rate a factor (1-5); replaces any earlier rating of the same factor.
    pub async fn rate_factor(
        &self,
        factor_id: &str,
        resonance: i32,
    ) -> Result<success_factor_ratings::Model, ClientError> {
        self.ratings
            .create(UpsertRating {
                factor_id: factor_id.to_string(),
                resonance,
                notes: None,
            })
            .await
    }

    /// Merge form fields into a block, showing them before the server answers.
    pub async fn save_fields(
        &self,
        block: BlockId,
        fields: Map<String, Value>,
    ) -> Result<plans::Model, ClientError> {
        let key = self.key(PLAN_KEY);
        let predicted_fields = fields.clone();

        let plan = self
            .executor
            .execute(
                &self.plan,
                &key,
                &format!("save {}", block.label()),
                move |current| {
                    let mut plan = current?.clone();
                    merge_block(&mut plan.blocks, block, predicted_fields);
                    Some(plan)
                },
                self.api.save_block(self.project_id, block, &fields),
            )
            .await?;

        let generation = self.plan.begin(&key).await;
        self.plan.resolve(&key, generation, plan.clone()).await;
        Ok(plan)
    }

    /// Facts for the progress rules, read from the cache.
    pub async fn state(&self) -> PlanState {
        let factor_ids = self
            .factors
            .get(&self.key(FACTORS_KEY))
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|factor| factor.id)
            .collect();

        let rated: Vec<success_factor_ratings::Model> = self.ratings.cached().await;
        let heuristic_count = self.heuristics.cached().await.len();
        let planned: Vec<project_tasks::Model> = self.tasks.cached().await;
        let policy_count = self.policies.cached().await.len();

        let framework_count = self
            .selection
            .get(&self.key(SELECTION_KEY))
            .await
            .map(|selection| selection.framework_codes.len())
            .unwrap_or(0);

        let blocks: HashMap<BlockId, Map<String, Value>> =
            match self.plan.get(&self.key(PLAN_KEY)).await {
                Some(plan) => BlockId::iter()
                    .map(|block| (block, block_fields(&plan, block)))
                    .collect(),
                None => HashMap::new(),
            };

        PlanState {
            factor_ids,
            rated_factor_ids: rated.into_iter().map(|rating| rating.factor_id).collect(),
            heuristic_count,
            policy_count,
            framework_count,
            task_stages: planned
                .iter()
                .filter_map(|task| task.stage.parse::<TaskStage>().ok())
                .collect(),
            blocks,
        }
    }

    pub async fn progress(&self) -> ProjectProgress {
        self.state().await.progress(self.project_id)
    }

    pub async fn view(&self, block: BlockId) -> BlockView {
        let state = self.state().await;
        BlockView {
            block,
            fields: state.blocks.get(&block).cloned().unwrap_or_default(),
            progress: state.block_progress(block),
        }
    }
}

/// Same merge the server performs on save.
fn merge_block(blocks: &mut Value, block: BlockId, fields: Map<String, Value>) {
    if !blocks.is_object() {
        *blocks = Value::Object(Map::new());
    }
    let Some(blocks) = blocks.as_object_mut() else {
        return;
    };

    let stored = blocks
        .entry(block.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !stored.is_object() {
        *stored = Value::Object(Map::new());
    }
    if let Some(stored) = stored.as_object_mut() {
        for (key, value) in fields {
            let value = if key == PERSONAL_HEURISTICS_KEY {
                normalize_heuristics(value)
            } else {
                value
            };
            stored.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_keeps_untouched_keys() {
        let mut blocks = json!({ "block1": { "successCriteria": "x", "notes": "keep" } });
        let fields = json!({ "successCriteria": "y" }).as_object().cloned().unwrap();
        merge_block(&mut blocks, BlockId::Discover, fields);
        assert_eq!(blocks["block1"]["successCriteria"], "y");
        assert_eq!(blocks["block1"]["notes"], "keep");
    }

    #[test]
    fn merge_creates_missing_blocks() {
        let mut blocks = Value::Null;
        let fields = json!({ "personalHeuristics": ["Ask early"] })
            .as_object()
            .cloned()
            .unwrap();
        merge_block(&mut blocks, BlockId::Design, fields);
        assert_eq!(blocks["block2"]["personalHeuristics"][0]["name"], "Ask early");
    }
}

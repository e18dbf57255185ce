use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::error::{error_message, ClientError};
use super::resource::Resource;
use crate::database::entities::{plans, success_factors};
use crate::domain::BlockId;
use crate::services::{FrameworkSelectionResponse, ProjectProgress, SaveFrameworkSelection};

/// CRUD access to one resource kind of a project.
#[async_trait]
pub trait RemoteStore<R: Resource>: Send + Sync {
    async fn list(&self, project_id: Uuid) -> Result<Vec<R::Record>, ClientError>;

    async fn create(&self, project_id: Uuid, input: &R::Create) -> Result<R::Record, ClientError>;

    async fn update(
        &self,
        project_id: Uuid,
        id: Uuid,
        patch: &R::Patch,
    ) -> Result<R::Record, ClientError>;

    async fn delete(&self, project_id: Uuid, id: Uuid) -> Result<(), ClientError>;
}

/// [`RemoteStore`] over the REST API.
pub struct HttpStore<R> {
    client: Client,
    base_url: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for HttpStore<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> HttpStore<R> {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            _resource: PhantomData,
        }
    }

    fn collection_url(&self, project_id: Uuid) -> String {
        format!("{}/api/projects/{}/{}", self.base_url, project_id, R::PATH)
    }

    fn item_url(&self, project_id: Uuid, id: Uuid) -> String {
        format!("{}/{}", self.collection_url(project_id), id)
    }
}

#[async_trait]
impl<R: Resource> RemoteStore<R> for HttpStore<R> {
    async fn list(&self, project_id: Uuid) -> Result<Vec<R::Record>, ClientError> {
        let url = self.collection_url(project_id);
        debug!("GET {}", url);
        decode(self.client.get(url).send().await?).await
    }

    async fn create(&self, project_id: Uuid, input: &R::Create) -> Result<R::Record, ClientError> {
        let url = self.collection_url(project_id);
        debug!("POST {}", url);
        decode(self.client.post(url).json(input).send().await?).await
    }

    async fn update(
        &self,
        project_id: Uuid,
        id: Uuid,
        patch: &R::Patch,
    ) -> Result<R::Record, ClientError> {
        let url = self.item_url(project_id, id);
        debug!("PUT {}", url);
        decode(self.client.put(url).json(patch).send().await?).await
    }

    async fn delete(&self, project_id: Uuid, id: Uuid) -> Result<(), ClientError> {
        let url = self.item_url(project_id, id);
        debug!("DELETE {}", url);
        check(self.client.delete(url).send().await?).await?;
        Ok(())
    }
}

/// Plan, catalog and progress endpoints, which are not plain collections.
#[derive(Clone)]
pub struct PlanApi {
    client: Client,
    base_url: String,
}

impl PlanApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn plan(&self, project_id: Uuid) -> Result<plans::Model, ClientError> {
        self.get(&format!("/api/projects/{}/plan", project_id)).await
    }

    pub async fn save_block(
        &self,
        project_id: Uuid,
        block: BlockId,
        fields: &Map<String, Value>,
    ) -> Result<plans::Model, ClientError> {
        let url = format!(
            "{}/api/projects/{}/plan/blocks/{}",
            self.base_url, project_id, block
        );
        debug!("PATCH {}", url);
        decode(self.client.patch(url).json(fields).send().await?).await
    }

    pub async fn progress(&self, project_id: Uuid) -> Result<ProjectProgress, ClientError> {
        self.get(&format!("/api/projects/{}/plan/progress", project_id))
            .await
    }

    pub async fn success_factors(&self) -> Result<Vec<success_factors::Model>, ClientError> {
        self.get("/api/success-factors").await
    }

    pub async fn framework_selection(
        &self,
        project_id: Uuid,
    ) -> Result<FrameworkSelectionResponse, ClientError> {
        self.get(&format!("/api/projects/{}/framework-selection", project_id))
            .await
    }

    pub async fn save_framework_selection(
        &self,
        project_id: Uuid,
        selection: &SaveFrameworkSelection,
    ) -> Result<FrameworkSelectionResponse, ClientError> {
        let url = format!(
            "{}/api/projects/{}/framework-selection",
            self.base_url, project_id
        );
        debug!("PUT {}", url);
        decode(self.client.put(url).json(selection).send().await?).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        decode(self.client.get(url).send().await?).await
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Http {
        status,
        message: error_message(&body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = check(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::entities::{personal_heuristics, policies, project_tasks as tasks};
use crate::domain::{
    parse_value, TaskOrigin, TaskPriority, TaskStage, TaskStatus, MAX_TASKS_PER_STAGE,
};
use crate::errors::{CoreError, CoreResult, TaskError};
use crate::frameworks;
use crate::services::{double_option, find_factor, require_project, ValidationService};

/// Query string filters for task listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "server", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub stage: Option<TaskStage>,
    pub origin: Option<TaskOrigin>,
    pub source_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub text: String,
    pub stage: TaskStage,
    pub origin: TaskOrigin,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<TaskStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "server", schema(value_type = Option<String>))]
    pub notes: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "server", schema(value_type = Option<TaskPriority>))]
    pub priority: Option<Option<TaskPriority>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "server", schema(value_type = Option<String>))]
    pub owner: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// Keep `completed` and `status` consistent. An explicit status wins; a bare
/// `completed` flag moves the status to `done` or back out of it.
pub fn reconcile_status(
    completed: Option<bool>,
    status: Option<TaskStatus>,
    current: (bool, TaskStatus),
) -> (bool, TaskStatus) {
    match (completed, status) {
        (Some(completed), Some(status)) => (completed, status),
        (None, Some(status)) => (status == TaskStatus::Done, status),
        (Some(true), None) => (true, TaskStatus::Done),
        (Some(false), None) if current.1 == TaskStatus::Done => (false, TaskStatus::Todo),
        (Some(false), None) => (false, current.1),
        (None, None) => current,
    }
}

/// Sources that share the per-stage cap. Custom tasks without a source are free.
fn capped_source(origin: TaskOrigin, source_id: Option<&str>) -> Result<Option<String>, TaskError> {
    match source_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(source_id) => Ok(Some(source_id.to_string())),
        None if origin == TaskOrigin::Custom => Ok(None),
        None => Err(TaskError::MissingSource(origin)),
    }
}

/// Resolve a trimmed source to the stored spelling of the thing it names, so
/// the cap count and the delete cascades match on one value per source.
async fn resolve_source<C>(
    db: &C,
    project_id: Uuid,
    origin: TaskOrigin,
    source_id: String,
) -> CoreResult<String>
where
    C: ConnectionTrait,
{
    let unknown = |source_id: &str| TaskError::UnknownSource {
        origin,
        source_id: source_id.to_string(),
    };

    match origin {
        TaskOrigin::Factor => {
            let lookup = Uuid::parse_str(&source_id)
                .map(|id| id.to_string())
                .unwrap_or_else(|_| source_id.clone());
            match find_factor(db, &lookup).await? {
                Some(factor) => Ok(factor.id),
                None => Err(unknown(&source_id).into()),
            }
        }
        TaskOrigin::Heuristic => {
            let id = Uuid::parse_str(&source_id).map_err(|_| unknown(&source_id))?;
            let found = personal_heuristics::Entity::find_by_id(id)
                .filter(personal_heuristics::Column::ProjectId.eq(project_id))
                .count(db)
                .await
                .map_err(TaskError::Database)?;
            if found == 0 {
                return Err(unknown(&source_id).into());
            }
            Ok(id.to_string())
        }
        TaskOrigin::Policy => {
            let id = Uuid::parse_str(&source_id).map_err(|_| unknown(&source_id))?;
            let found = policies::Entity::find_by_id(id)
                .filter(policies::Column::ProjectId.eq(project_id))
                .count(db)
                .await
                .map_err(TaskError::Database)?;
            if found == 0 {
                return Err(unknown(&source_id).into());
            }
            Ok(id.to_string())
        }
        TaskOrigin::Framework => {
            let code = source_id.to_lowercase();
            if !frameworks::is_known(&code) {
                return Err(unknown(&source_id).into());
            }
            Ok(code)
        }
        TaskOrigin::Custom => Ok(source_id),
    }
}

#[derive(Clone)]
pub struct TaskService {
    db: DatabaseConnection,
}

impl TaskService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, project_id: Uuid, filter: TaskFilter) -> CoreResult<Vec<tasks::Model>> {
        require_project(&self.db, project_id).await?;

        let mut query = tasks::Entity::find().filter(tasks::Column::ProjectId.eq(project_id));
        if let Some(stage) = filter.stage {
            query = query.filter(tasks::Column::Stage.eq(stage.as_ref()));
        }
        if let Some(origin) = filter.origin {
            query = query.filter(tasks::Column::Origin.eq(origin.as_ref()));
        }
        if let Some(source_id) = filter.source_id {
            query = query.filter(tasks::Column::SourceId.eq(source_id));
        }

        query
            .order_by_asc(tasks::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list tasks", e))
    }

    /// Insert a task. The cap check and the insert share one transaction so
    /// a fourth task for the same source and stage is never persisted.
    pub async fn create(&self, project_id: Uuid, input: CreateTask) -> CoreResult<tasks::Model> {
        let text = input.text.trim().to_string();
        if text.is_empty() {
            return Err(TaskError::EmptyText.into());
        }
        let source_id = capped_source(input.origin, input.source_id.as_deref())?;
        let notes = ValidationService::validate_text("notes", input.notes.as_deref())?;
        let owner = ValidationService::validate_text("owner", input.owner.as_deref())?;
        let (completed, status) =
            reconcile_status(input.completed, input.status, (false, TaskStatus::Todo));

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        require_project(&txn, project_id).await?;
        let source_id = match source_id {
            Some(source_id) => {
                let source_id = resolve_source(&txn, project_id, input.origin, source_id).await?;
                ensure_capacity(&txn, project_id, input.origin, &source_id, input.stage, None)
                    .await?;
                Some(source_id)
            }
            None => None,
        };

        let now = chrono::Utc::now();
        let task = tasks::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            text: Set(text),
            stage: Set(input.stage.to_string()),
            origin: Set(input.origin.to_string()),
            source_id: Set(source_id),
            completed: Set(completed),
            notes: Set(notes),
            priority: Set(input.priority.map(|p| p.to_string())),
            owner: Set(owner),
            status: Set(status.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(TaskError::Database)?;

        txn.commit().await.map_err(TaskError::Database)?;

        debug!(
            "Created {} task {} in stage {} for project {}",
            task.origin, task.id, task.stage, project_id
        );
        Ok(task)
    }

    /// Partial update. Moving a sourced task to another stage re-checks the cap.
    pub async fn update(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        input: UpdateTask,
    ) -> CoreResult<tasks::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        let task = tasks::Entity::find_by_id(task_id)
            .filter(tasks::Column::ProjectId.eq(project_id))
            .one(&txn)
            .await
            .map_err(TaskError::Database)?
            .ok_or(TaskError::NotFound(task_id))?;

        let current_stage: TaskStage = parse_value("stage", &task.stage)?;
        let current_status: TaskStatus = parse_value("status", &task.status).unwrap_or_default();

        if let Some(stage) = input.stage.filter(|stage| *stage != current_stage) {
            if let Some(source_id) = task.source_id.as_deref() {
                let origin: TaskOrigin = parse_value("origin", &task.origin)?;
                ensure_capacity(&txn, project_id, origin, source_id, stage, Some(task_id)).await?;
            }
        }

        let (completed, status) =
            reconcile_status(input.completed, input.status, (task.completed, current_status));

        let mut active: tasks::ActiveModel = task.into();
        if let Some(text) = input.text {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err(TaskError::EmptyText.into());
            }
            active.text = Set(text);
        }
        if let Some(stage) = input.stage {
            active.stage = Set(stage.to_string());
        }
        if let Some(notes) = input.notes {
            active.notes = Set(ValidationService::validate_text("notes", notes.as_deref())?);
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority.map(|p| p.to_string()));
        }
        if let Some(owner) = input.owner {
            active.owner = Set(ValidationService::validate_text("owner", owner.as_deref())?);
        }
        active.completed = Set(completed);
        active.status = Set(status.to_string());
        active.updated_at = Set(chrono::Utc::now());

        let task = active.update(&txn).await.map_err(TaskError::Database)?;
        txn.commit().await.map_err(TaskError::Database)?;
        Ok(task)
    }

    pub async fn delete(&self, project_id: Uuid, task_id: Uuid) -> CoreResult<()> {
        let result = tasks::Entity::delete_many()
            .filter(tasks::Column::Id.eq(task_id))
            .filter(tasks::Column::ProjectId.eq(project_id))
            .exec(&self.db)
            .await
            .map_err(TaskError::Database)?;

        if result.rows_affected == 0 {
            return Err(TaskError::NotFound(task_id).into());
        }
        Ok(())
    }
}

async fn ensure_capacity<C>(
    db: &C,
    project_id: Uuid,
    origin: TaskOrigin,
    source_id: &str,
    stage: TaskStage,
    exclude: Option<Uuid>,
) -> Result<(), TaskError>
where
    C: ConnectionTrait,
{
    let mut query = tasks::Entity::find()
        .filter(tasks::Column::ProjectId.eq(project_id))
        .filter(tasks::Column::Origin.eq(origin.as_ref()))
        .filter(tasks::Column::SourceId.eq(source_id))
        .filter(tasks::Column::Stage.eq(stage.as_ref()));
    if let Some(exclude) = exclude {
        query = query.filter(tasks::Column::Id.ne(exclude));
    }

    let existing = query.count(db).await?;
    if existing >= MAX_TASKS_PER_STAGE {
        warn!(
            "Rejected task for {} source {} in stage {}: cap of {} reached",
            origin, source_id, stage, MAX_TASKS_PER_STAGE
        );
        return Err(TaskError::CapReached {
            origin,
            source_id: source_id.to_string(),
            stage,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completing_without_status_marks_done() {
        assert_eq!(
            reconcile_status(Some(true), None, (false, TaskStatus::InProgress)),
            (true, TaskStatus::Done)
        );
    }

    #[test]
    fn reopening_a_done_task_returns_to_todo() {
        assert_eq!(
            reconcile_status(Some(false), None, (true, TaskStatus::Done)),
            (false, TaskStatus::Todo)
        );
        assert_eq!(
            reconcile_status(Some(false), None, (false, TaskStatus::Blocked)),
            (false, TaskStatus::Blocked)
        );
    }

    #[test]
    fn explicit_status_drives_completed() {
        assert_eq!(
            reconcile_status(None, Some(TaskStatus::Done), (false, TaskStatus::Todo)),
            (true, TaskStatus::Done)
        );
        assert_eq!(
            reconcile_status(None, Some(TaskStatus::Blocked), (true, TaskStatus::Done)),
            (false, TaskStatus::Blocked)
        );
    }

    #[test]
    fn custom_tasks_may_omit_a_source() {
        assert_eq!(capped_source(TaskOrigin::Custom, None).unwrap(), None);
        assert_eq!(capped_source(TaskOrigin::Custom, Some("  ")).unwrap(), None);
        assert!(matches!(
            capped_source(TaskOrigin::Policy, None),
            Err(TaskError::MissingSource(TaskOrigin::Policy))
        ));
        assert_eq!(
            capped_source(TaskOrigin::Heuristic, Some(" h1 ")).unwrap(),
            Some("h1".to_string())
        );
    }
}

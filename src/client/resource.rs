//! Resource kinds the planning client mutates optimistically.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::database::entities::{
    personal_heuristics, policies, project_tasks, success_factor_ratings,
};
use crate::domain::TaskStatus;
use crate::legacy_ids::canonical_factor_id;
use crate::services::{
    reconcile_status, CreateHeuristic, CreatePolicy, CreateTask, UpdateHeuristic, UpdatePolicy,
    UpdateRating, UpdateTask, UpsertRating,
};

/// A project-scoped collection served at `/api/projects/{id}/{PATH}`.
///
/// `predict_create` and `apply_patch` compute the value shown to the user
/// before the server has answered; the server's answer always replaces it.
pub trait Resource: Send + Sync + 'static {
    const PATH: &'static str;
    /// Human readable name used in notifications.
    const NAME: &'static str;

    type Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static;
    type Create: Clone + Send + Sync + Serialize + 'static;
    type Patch: Clone + Send + Sync + Serialize + 'static;

    fn id(record: &Self::Record) -> Uuid;

    fn predict_create(project_id: Uuid, input: &Self::Create) -> Self::Record;

    fn apply_patch(record: &mut Self::Record, patch: &Self::Patch);

    /// Place a predicted record in the cached list.
    fn insert_predicted(records: &mut Vec<Self::Record>, record: Self::Record) {
        records.push(record);
    }
}

pub struct Ratings;
pub struct Heuristics;
pub struct Tasks;
pub struct Policies;

impl Resource for Ratings {
    const PATH: &'static str = "success-factor-ratings";
    const NAME: &'static str = "rating";

    type Record = success_factor_ratings::Model;
    type Create = UpsertRating;
    type Patch = UpdateRating;

    fn id(record: &Self::Record) -> Uuid {
        record.id
    }

    fn predict_create(project_id: Uuid, input: &Self::Create) -> Self::Record {
        let now = Utc::now();
        success_factor_ratings::Model {
            id: Uuid::new_v4(),
            project_id,
            factor_id: canonical_factor_id(&input.factor_id),
            resonance: input.resonance,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(record: &mut Self::Record, patch: &Self::Patch) {
        if let Some(resonance) = patch.resonance {
            record.resonance = resonance;
        }
        if let Some(notes) = &patch.notes {
            record.notes = notes.clone();
        }
        record.updated_at = Utc::now();
    }

    // posting a rating upserts by factor
    fn insert_predicted(records: &mut Vec<Self::Record>, record: Self::Record) {
        match records.iter_mut().find(|r| r.factor_id == record.factor_id) {
            Some(existing) => {
                existing.resonance = record.resonance;
                existing.notes = record.notes;
                existing.updated_at = record.updated_at;
            }
            None => records.push(record),
        }
    }
}

impl Resource for Heuristics {
    const PATH: &'static str = "heuristics";
    const NAME: &'static str = "heuristic";

    type Record = personal_heuristics::Model;
    type Create = CreateHeuristic;
    type Patch = UpdateHeuristic;

    fn id(record: &Self::Record) -> Uuid {
        record.id
    }

    fn predict_create(project_id: Uuid, input: &Self::Create) -> Self::Record {
        let now = Utc::now();
        personal_heuristics::Model {
            id: Uuid::new_v4(),
            project_id,
            factor_id: input.factor_id.as_deref().map(canonical_factor_id),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(record: &mut Self::Record, patch: &Self::Patch) {
        if let Some(name) = &patch.name {
            record.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            record.description = description.clone();
        }
        if let Some(factor_id) = &patch.factor_id {
            record.factor_id = factor_id.as_deref().map(canonical_factor_id);
        }
        record.updated_at = Utc::now();
    }
}

impl Resource for Tasks {
    const PATH: &'static str = "tasks";
    const NAME: &'static str = "task";

    type Record = project_tasks::Model;
    type Create = CreateTask;
    type Patch = UpdateTask;

    fn id(record: &Self::Record) -> Uuid {
        record.id
    }

    fn predict_create(project_id: Uuid, input: &Self::Create) -> Self::Record {
        let now = Utc::now();
        let (completed, status) =
            reconcile_status(input.completed, input.status, (false, TaskStatus::Todo));
        project_tasks::Model {
            id: Uuid::new_v4(),
            project_id,
            text: input.text.trim().to_string(),
            stage: input.stage.to_string(),
            origin: input.origin.to_string(),
            source_id: input.source_id.clone(),
            completed,
            notes: input.notes.clone(),
            priority: input.priority.map(|p| p.to_string()),
            owner: input.owner.clone(),
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(record: &mut Self::Record, patch: &Self::Patch) {
        if let Some(text) = &patch.text {
            record.text = text.trim().to_string();
        }
        if let Some(stage) = patch.stage {
            record.stage = stage.to_string();
        }
        if let Some(notes) = &patch.notes {
            record.notes = notes.clone();
        }
        if let Some(priority) = &patch.priority {
            record.priority = priority.map(|p| p.to_string());
        }
        if let Some(owner) = &patch.owner {
            record.owner = owner.clone();
        }
        let current = record.status.parse::<TaskStatus>().unwrap_or_default();
        let (completed, status) =
            reconcile_status(patch.completed, patch.status, (record.completed, current));
        record.completed = completed;
        record.status = status.to_string();
        record.updated_at = Utc::now();
    }
}

impl Resource for Policies {
    const PATH: &'static str = "policies";
    const NAME: &'static str = "policy";

    type Record = policies::Model;
    type Create = CreatePolicy;
    type Patch = UpdatePolicy;

    fn id(record: &Self::Record) -> Uuid {
        record.id
    }

    fn predict_create(project_id: Uuid, input: &Self::Create) -> Self::Record {
        let now = Utc::now();
        policies::Model {
            id: Uuid::new_v4(),
            project_id,
            organisation_id: input.organisation_id,
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(record: &mut Self::Record, patch: &Self::Patch) {
        if let Some(name) = &patch.name {
            record.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            record.description = description.clone();
        }
        record.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskOrigin, TaskStage};
    use crate::legacy_ids::factor_uuid;

    #[test]
    fn predicted_rating_replaces_same_factor() {
        let project = Uuid::new_v4();
        let first = Ratings::predict_create(
            project,
            &UpsertRating {
                factor_id: "sf-1".to_string(),
                resonance: 2,
                notes: None,
            },
        );
        assert_eq!(first.factor_id, factor_uuid("sf-1").to_string());

        let mut records = vec![first.clone()];
        let second = Ratings::predict_create(
            project,
            &UpsertRating {
                factor_id: first.factor_id.clone(),
                resonance: 5,
                notes: Some("strong".to_string()),
            },
        );
        Ratings::insert_predicted(&mut records, second);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, first.id);
        assert_eq!(records[0].resonance, 5);
    }

    #[test]
    fn completing_a_predicted_task_marks_it_done() {
        let mut task = Tasks::predict_create(
            Uuid::new_v4(),
            &CreateTask {
                text: " Map stakeholders ".to_string(),
                stage: TaskStage::Identification,
                origin: TaskOrigin::Custom,
                source_id: None,
                completed: None,
                notes: None,
                priority: None,
                owner: None,
                status: None,
            },
        );
        assert_eq!(task.text, "Map stakeholders");
        assert_eq!(task.status, "todo");

        Tasks::apply_patch(
            &mut task,
            &UpdateTask {
                completed: Some(true),
                ..Default::default()
            },
        );
        assert!(task.completed);
        assert_eq!(task.status, "done");
    }
}

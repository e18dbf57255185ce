use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::database::entities::plans;
use crate::domain::BlockId;
use crate::errors::{CoreError, CoreResult, PlanError};
use crate::legacy_ids::heuristic_uuid;
use crate::services::{empty_blocks, require_project};

/// Key inside a block that holds the user's personal heuristics.
pub const PERSONAL_HEURISTICS_KEY: &str = "personalHeuristics";

#[derive(Clone)]
pub struct PlanService {
    db: DatabaseConnection,
}

impl PlanService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetch the project's plan, creating an empty one if it is missing.
    pub async fn get_or_create(&self, project_id: Uuid) -> CoreResult<plans::Model> {
        require_project(&self.db, project_id).await?;

        if let Some(plan) = self.find(project_id).await? {
            return Ok(plan);
        }

        debug!("Project {} has no plan yet, creating one", project_id);
        let now = chrono::Utc::now();
        plans::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            blocks: Set(empty_blocks()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| CoreError::database("create plan", e))
    }

    /// Merge `content` into the stored block. Top-level keys in `content`
    /// replace the stored keys; keys not mentioned are left untouched.
    pub async fn save_block(
        &self,
        project_id: Uuid,
        block: &str,
        content: Value,
    ) -> CoreResult<plans::Model> {
        let block: BlockId = block
            .parse()
            .map_err(|_| PlanError::UnknownBlock(block.to_string()))?;
        let Value::Object(content) = content else {
            return Err(PlanError::BlockNotObject.into());
        };

        // ensure the row exists before the write transaction
        self.get_or_create(project_id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        let plan = plans::Entity::find()
            .filter(plans::Column::ProjectId.eq(project_id))
            .one(&txn)
            .await
            .map_err(|e| CoreError::database("load plan", e))?
            .ok_or(PlanError::NotFound(project_id))?;

        let mut blocks = match plan.blocks.clone() {
            Value::Object(blocks) => blocks,
            Value::Null => Map::new(),
            other => {
                return Err(PlanError::CorruptBlocks(format!(
                    "expected an object, found {}",
                    other
                ))
                .into())
            }
        };

        let mut stored = match blocks.remove(block.as_ref()) {
            Some(Value::Object(stored)) => stored,
            _ => Map::new(),
        };
        for (key, value) in content {
            let value = if key == PERSONAL_HEURISTICS_KEY {
                normalize_heuristics(value)
            } else {
                value
            };
            stored.insert(key, value);
        }
        blocks.insert(block.to_string(), Value::Object(stored));

        let mut active: plans::ActiveModel = plan.into();
        active.blocks = Set(Value::Object(blocks));
        active.updated_at = Set(chrono::Utc::now());
        let plan = active
            .update(&txn)
            .await
            .map_err(|e| CoreError::database("save block", e))?;

        txn.commit()
            .await
            .map_err(|e| CoreError::database("commit block", e))?;

        debug!("Saved {} for project {}", block, project_id);
        Ok(plan)
    }

    async fn find(&self, project_id: Uuid) -> CoreResult<Option<plans::Model>> {
        plans::Entity::find()
            .filter(plans::Column::ProjectId.eq(project_id))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("load plan", e))
    }
}

/// Form fields stored for one block, or an empty map.
pub fn block_fields(plan: &plans::Model, block: BlockId) -> Map<String, Value> {
    match plan.blocks.get(block.as_ref()) {
        Some(Value::Object(fields)) => fields.clone(),
        _ => Map::new(),
    }
}

/// Rewrite a `personalHeuristics` array so every entry is an
/// `{id, name, description}` object. Bare strings get a stable id derived
/// from their text.
pub fn normalize_heuristics(value: Value) -> Value {
    let Value::Array(items) = value else {
        return value;
    };

    let normalized = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(text) => {
                let name = text.trim();
                if name.is_empty() {
                    return None;
                }
                Some(json!({
                    "id": heuristic_uuid(name).to_string(),
                    "name": name,
                    "description": "",
                }))
            }
            Value::Object(mut entry) => {
                let name = entry
                    .get("name")
                    .or_else(|| entry.get("text"))
                    .and_then(Value::as_str)
                    .map(|name| name.trim().to_string())
                    .unwrap_or_default();
                entry.remove("text");
                if !entry.get("id").is_some_and(Value::is_string) {
                    entry.insert("id".into(), Value::String(heuristic_uuid(&name).to_string()));
                }
                entry.insert("name".into(), Value::String(name));
                entry
                    .entry("description")
                    .or_insert_with(|| Value::String(String::new()));
                Some(Value::Object(entry))
            }
            _ => None,
        })
        .collect();

    Value::Array(normalized)
}

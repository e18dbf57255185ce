use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::IntoEnumIterator;
use tracing::debug;
use uuid::Uuid;

use crate::database::entities::{
    framework_selections, personal_heuristics, policies, project_tasks, success_factor_ratings,
    success_factors,
};
use crate::domain::{BlockId, TaskStage};
use crate::errors::{CoreError, CoreResult};
use crate::progress::{completion_percentage, BlockSnapshot, Progress, ProgressRules};
use crate::services::{block_fields, PlanService};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BlockProgress {
    pub block: BlockId,
    pub label: String,
    pub percentage: u8,
    pub completed_weight: u32,
    pub total_weight: u32,
    pub outstanding: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgress {
    pub project_id: Uuid,
    pub blocks: Vec<BlockProgress>,
    /// Weighted over every rule of every block.
    pub overall: u8,
}

impl ProjectProgress {
    pub fn block(&self, block: BlockId) -> Option<&BlockProgress> {
        self.blocks.iter().find(|progress| progress.block == block)
    }
}

/// The facts progress is computed from, independent of where they were
/// loaded (database on the server, query cache on the client).
#[derive(Debug, Clone, Default)]
pub struct PlanState {
    pub factor_ids: Vec<String>,
    pub rated_factor_ids: Vec<String>,
    pub heuristic_count: usize,
    pub policy_count: usize,
    pub framework_count: usize,
    pub task_stages: Vec<TaskStage>,
    pub blocks: HashMap<BlockId, Map<String, Value>>,
}

impl PlanState {
    pub fn snapshot(&self, block: BlockId) -> BlockSnapshot {
        let mut tasks_per_stage = HashMap::new();
        for stage in &self.task_stages {
            *tasks_per_stage.entry(*stage).or_insert(0) += 1;
        }

        BlockSnapshot {
            rated_factors: self.rated_factor_ids.iter().cloned().collect(),
            heuristic_count: self.heuristic_count,
            policy_count: self.policy_count,
            framework_count: self.framework_count,
            tasks_per_stage,
            fields: Map::new(),
        }
        .with_fields(self.blocks.get(&block).cloned().unwrap_or_default())
    }

    pub fn block_progress(&self, block: BlockId) -> BlockProgress {
        let Progress {
            completed_weight,
            total_weight,
            percentage,
            outstanding,
        } = ProgressRules::for_block(block, self.factor_ids.iter().cloned())
            .evaluate(&self.snapshot(block));

        BlockProgress {
            block,
            label: block.label().to_string(),
            percentage,
            completed_weight,
            total_weight,
            outstanding,
        }
    }

    pub fn progress(&self, project_id: Uuid) -> ProjectProgress {
        let blocks: Vec<BlockProgress> = BlockId::iter()
            .map(|block| self.block_progress(block))
            .collect();
        let completed: u32 = blocks.iter().map(|b| b.completed_weight).sum();
        let total: u32 = blocks.iter().map(|b| b.total_weight).sum();

        ProjectProgress {
            project_id,
            overall: completion_percentage(completed, total),
            blocks,
        }
    }
}

#[derive(Clone)]
pub struct ProgressService {
    db: DatabaseConnection,
    plans: PlanService,
}

impl ProgressService {
    pub fn new(db: DatabaseConnection) -> Self {
        let plans = PlanService::new(db.clone());
        Self { db, plans }
    }

    pub async fn project_progress(&self, project_id: Uuid) -> CoreResult<ProjectProgress> {
        let state = self.load_state(project_id).await?;
        let progress = state.progress(project_id);
        debug!("Project {} is {}% complete", project_id, progress.overall);
        Ok(progress)
    }

    pub async fn load_state(&self, project_id: Uuid) -> CoreResult<PlanState> {
        let plan = self.plans.get_or_create(project_id).await?;

        let factor_ids = success_factors::Entity::find()
            .order_by_asc(success_factors::Column::Position)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list success factors", e))?
            .into_iter()
            .map(|factor| factor.id)
            .collect();

        let rated_factor_ids = success_factor_ratings::Entity::find()
            .filter(success_factor_ratings::Column::ProjectId.eq(project_id))
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list ratings", e))?
            .into_iter()
            .map(|rating| rating.factor_id)
            .collect();

        let heuristic_count = personal_heuristics::Entity::find()
            .filter(personal_heuristics::Column::ProjectId.eq(project_id))
            .count(&self.db)
            .await
            .map_err(|e| CoreError::database("count heuristics", e))?;

        let policy_count = policies::Entity::find()
            .filter(policies::Column::ProjectId.eq(project_id))
            .count(&self.db)
            .await
            .map_err(|e| CoreError::database("count policies", e))?;

        let framework_count = framework_selections::Entity::find()
            .filter(framework_selections::Column::ProjectId.eq(project_id))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("load framework selection", e))?
            .map(|selection| selection.codes().len())
            .unwrap_or(0);

        let task_stages = project_tasks::Entity::find()
            .filter(project_tasks::Column::ProjectId.eq(project_id))
            .all(&self.db)
            .await
            .map_err(|e| CoreError::database("list tasks", e))?
            .into_iter()
            .filter_map(|task| task.stage.parse::<TaskStage>().ok())
            .collect();

        let blocks = BlockId::iter()
            .map(|block| (block, block_fields(&plan, block)))
            .collect();

        Ok(PlanState {
            factor_ids,
            rated_factor_ids,
            heuristic_count: heuristic_count as usize,
            policy_count: policy_count as usize,
            framework_count,
            task_stages,
            blocks,
        })
    }
}

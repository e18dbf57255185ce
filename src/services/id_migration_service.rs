use std::collections::BTreeMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::database::entities::{
    personal_heuristics, plans, project_tasks, success_factor_ratings, success_factors,
};
use crate::domain::TaskOrigin;
use crate::errors::MigrationError;
use crate::legacy_ids::{factor_uuid, is_legacy_id};
use crate::services::PERSONAL_HEURISTICS_KEY;

/// Counts of rows touched by one run of the legacy id migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// legacy id -> new id
    pub factors: BTreeMap<String, String>,
    pub ratings_updated: u64,
    pub heuristics_updated: u64,
    pub tasks_updated: u64,
    pub plans_updated: u64,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.factors.is_empty()
            && self.ratings_updated == 0
            && self.heuristics_updated == 0
            && self.tasks_updated == 0
            && self.plans_updated == 0
    }
}

/// Rewrites `sf-N` success factor ids, and every reference to them, into
/// their deterministic UUIDs.
#[derive(Clone)]
pub struct IdMigrationService {
    db: DatabaseConnection,
}

impl IdMigrationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Runs in a single transaction; any failure leaves the database untouched.
    /// A second run finds nothing to do.
    pub async fn migrate_legacy_ids(&self) -> Result<MigrationReport, MigrationError> {
        let txn = self.db.begin().await?;

        match migrate(&txn).await {
            Ok(report) => {
                txn.commit().await?;
                if report.is_noop() {
                    info!("No legacy ids found");
                } else {
                    info!(
                        "Migrated {} success factors ({} ratings, {} heuristics, {} tasks, {} plans)",
                        report.factors.len(),
                        report.ratings_updated,
                        report.heuristics_updated,
                        report.tasks_updated,
                        report.plans_updated
                    );
                }
                Ok(report)
            }
            Err(err) => {
                warn!("Legacy id migration failed, rolling back: {}", err);
                txn.rollback().await?;
                Err(err)
            }
        }
    }
}

async fn migrate(txn: &DatabaseTransaction) -> Result<MigrationReport, MigrationError> {
    let mut report = MigrationReport::default();

    let legacy_factors: Vec<success_factors::Model> = success_factors::Entity::find()
        .all(txn)
        .await?
        .into_iter()
        .filter(|factor| is_legacy_id(&factor.id))
        .collect();

    for legacy in legacy_factors {
        let new_id = factor_uuid(&legacy.id).to_string();

        match success_factors::Entity::find_by_id(new_id.clone()).one(txn).await? {
            Some(existing) if existing.title != legacy.title => {
                return Err(MigrationError::Collision {
                    legacy_id: legacy.id,
                    new_id,
                });
            }
            // seeded alongside the legacy row; only references need moving
            Some(_) => {}
            None => {
                success_factors::ActiveModel {
                    id: Set(new_id.clone()),
                    title: Set(legacy.title.clone()),
                    description: Set(legacy.description.clone()),
                    position: Set(legacy.position),
                }
                .insert(txn)
                .await?;
            }
        }

        report.ratings_updated += success_factor_ratings::Entity::update_many()
            .col_expr(
                success_factor_ratings::Column::FactorId,
                Expr::value(new_id.clone()),
            )
            .filter(success_factor_ratings::Column::FactorId.eq(legacy.id.clone()))
            .exec(txn)
            .await?
            .rows_affected;

        report.heuristics_updated += personal_heuristics::Entity::update_many()
            .col_expr(
                personal_heuristics::Column::FactorId,
                Expr::value(new_id.clone()),
            )
            .filter(personal_heuristics::Column::FactorId.eq(legacy.id.clone()))
            .exec(txn)
            .await?
            .rows_affected;

        report.tasks_updated += project_tasks::Entity::update_many()
            .col_expr(project_tasks::Column::SourceId, Expr::value(new_id.clone()))
            .filter(project_tasks::Column::Origin.eq(TaskOrigin::Factor.as_ref()))
            .filter(project_tasks::Column::SourceId.eq(legacy.id.clone()))
            .exec(txn)
            .await?
            .rows_affected;

        success_factors::Entity::delete_by_id(legacy.id.clone())
            .exec(txn)
            .await?;

        report.factors.insert(legacy.id, new_id);
    }

    for plan in plans::Entity::find().all(txn).await? {
        let mut blocks = plan.blocks.clone();
        if !rewrite_plan_blocks(&mut blocks) {
            continue;
        }

        let mut active: plans::ActiveModel = plan.into();
        active.blocks = Set(blocks);
        active.update(txn).await?;
        report.plans_updated += 1;
    }

    Ok(report)
}

fn migrated_factor_id(id: &str) -> Option<String> {
    (!id.is_empty() && is_legacy_id(id)).then(|| factor_uuid(id).to_string())
}

/// Rewrite legacy factor ids held inside plan block JSON: the keys of a
/// block's `ratings` object and the `factorId` of personal heuristics.
/// Returns whether anything changed.
pub fn rewrite_plan_blocks(blocks: &mut Value) -> bool {
    let Value::Object(blocks) = blocks else {
        return false;
    };

    let mut changed = false;
    for block in blocks.values_mut() {
        let Value::Object(block) = block else {
            continue;
        };

        if let Some(Value::Object(ratings)) = block.get_mut("ratings") {
            if ratings.keys().any(|key| migrated_factor_id(key).is_some()) {
                let rewritten: Map<String, Value> = std::mem::take(ratings)
                    .into_iter()
                    .map(|(key, value)| (migrated_factor_id(&key).unwrap_or(key), value))
                    .collect();
                *ratings = rewritten;
                changed = true;
            }
        }

        if let Some(Value::Array(heuristics)) = block.get_mut(PERSONAL_HEURISTICS_KEY) {
            for heuristic in heuristics.iter_mut() {
                let Some(factor_id) = heuristic.get_mut("factorId") else {
                    continue;
                };
                if let Some(new_id) = factor_id.as_str().and_then(migrated_factor_id) {
                    *factor_id = Value::String(new_id);
                    changed = true;
                }
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_json_references_are_rewritten_once() {
        let mut blocks = json!({
            "block1": {
                "ratings": { "sf-1": 5, "sf-2": 3 },
                "personalHeuristics": [
                    { "id": "h", "name": "Ask", "description": "", "factorId": "sf-2" }
                ]
            },
            "block2": {}
        });

        assert!(rewrite_plan_blocks(&mut blocks));
        let sf1 = factor_uuid("sf-1").to_string();
        let sf2 = factor_uuid("sf-2").to_string();
        assert_eq!(blocks["block1"]["ratings"][&sf1], 5);
        assert_eq!(blocks["block1"]["ratings"][&sf2], 3);
        assert_eq!(blocks["block1"]["personalHeuristics"][0]["factorId"], sf2.as_str());

        assert!(!rewrite_plan_blocks(&mut blocks));
    }

    #[test]
    fn any_non_uuid_factor_id_is_legacy() {
        let mut blocks = json!({
            "block1": {
                "ratings": { "growth-mindset": 4 },
                "personalHeuristics": [
                    { "id": "h", "name": "Learn", "description": "", "factorId": "growth-mindset" },
                    { "id": "g", "name": "Loose", "description": "", "factorId": "" }
                ]
            }
        });

        assert!(rewrite_plan_blocks(&mut blocks));
        let migrated = factor_uuid("growth-mindset").to_string();
        assert_eq!(blocks["block1"]["ratings"][&migrated], 4);
        assert_eq!(blocks["block1"]["personalHeuristics"][0]["factorId"], migrated.as_str());
        assert_eq!(blocks["block1"]["personalHeuristics"][1]["factorId"], "");
    }
}

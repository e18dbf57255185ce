//! Legacy success factor id migration

use anyhow::Result;
use chrono::Utc;
use makeaplan::database::connection::{establish_connection, setup_database};
use makeaplan::database::entities::{
    personal_heuristics, plans, project_tasks, success_factor_ratings, success_factors,
};
use makeaplan::database::migrations::Migrator;
use makeaplan::domain::{TaskOrigin, TaskStage, TaskStatus};
use makeaplan::errors::MigrationError;
use makeaplan::legacy_ids::factor_uuid;
use makeaplan::services::{CreateProject, IdMigrationService, ProjectService};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

/// A database as it looked before UUID factor ids: schema only, with two
/// catalog entries still keyed by their slugs.
async fn setup_legacy_db() -> Result<(DatabaseConnection, TempDir)> {
    let dir = tempfile::tempdir()?;
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("legacy.db").display());
    let db = establish_connection(&db_url).await?;
    Migrator::up(&db, None).await?;

    for (position, slug, title) in [(1, "sf-1", "Clear sponsor"), (2, "sf-2", "Shared vision")] {
        success_factors::ActiveModel {
            id: Set(slug.to_string()),
            title: Set(title.to_string()),
            description: Set(String::new()),
            position: Set(position),
        }
        .insert(&db)
        .await?;
    }

    Ok((db, dir))
}

async fn seed_references(db: &DatabaseConnection) -> Result<Uuid> {
    let project = ProjectService::new(db.clone())
        .create(CreateProject {
            name: "Legacy".to_string(),
            ..Default::default()
        })
        .await?;
    let now = Utc::now();

    success_factor_ratings::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project.id),
        factor_id: Set("sf-1".to_string()),
        resonance: Set(4),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    personal_heuristics::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project.id),
        factor_id: Set(Some("sf-2".to_string())),
        name: Set("Repeat the goal".to_string()),
        description: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    project_tasks::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project.id),
        text: Set("Meet the sponsor".to_string()),
        stage: Set(TaskStage::Identification.to_string()),
        origin: Set(TaskOrigin::Factor.to_string()),
        source_id: Set(Some("sf-1".to_string())),
        completed: Set(false),
        notes: Set(None),
        priority: Set(None),
        owner: Set(None),
        status: Set(TaskStatus::Todo.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let plan = plans::Entity::find()
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("project has no plan"))?;
    let mut active: plans::ActiveModel = plan.into();
    active.blocks = Set(json!({
        "block1": { "ratings": { "sf-1": 4 } },
        "block2": {},
        "block3": {}
    }));
    active.update(db).await?;

    Ok(project.id)
}

#[tokio::test]
async fn test_legacy_ids_are_rewritten_everywhere() -> Result<()> {
    let (db, _dir) = setup_legacy_db().await?;
    seed_references(&db).await?;

    // seeding skips the slugs that are already present
    setup_database(&db).await?;
    assert_eq!(success_factors::Entity::find().all(&db).await?.len(), 12);

    let service = IdMigrationService::new(db.clone());
    let report = service.migrate_legacy_ids().await?;

    let sf1 = factor_uuid("sf-1").to_string();
    let sf2 = factor_uuid("sf-2").to_string();
    assert_eq!(report.factors.get("sf-1"), Some(&sf1));
    assert_eq!(report.factors.get("sf-2"), Some(&sf2));
    assert_eq!(report.ratings_updated, 1);
    assert_eq!(report.heuristics_updated, 1);
    assert_eq!(report.tasks_updated, 1);
    assert_eq!(report.plans_updated, 1);

    let factors = success_factors::Entity::find().all(&db).await?;
    assert_eq!(factors.len(), 12);
    assert!(factors.iter().all(|factor| Uuid::parse_str(&factor.id).is_ok()));

    let rating = success_factor_ratings::Entity::find().one(&db).await?.unwrap();
    assert_eq!(rating.factor_id, sf1);
    let heuristic = personal_heuristics::Entity::find().one(&db).await?.unwrap();
    assert_eq!(heuristic.factor_id.as_deref(), Some(sf2.as_str()));
    let task = project_tasks::Entity::find().one(&db).await?.unwrap();
    assert_eq!(task.source_id.as_deref(), Some(sf1.as_str()));
    let plan = plans::Entity::find().one(&db).await?.unwrap();
    assert_eq!(plan.blocks["block1"]["ratings"][&sf1], 4);

    let second = service.migrate_legacy_ids().await?;
    assert!(second.is_noop());

    Ok(())
}

#[tokio::test]
async fn test_collision_rolls_back_everything() -> Result<()> {
    let (db, _dir) = setup_legacy_db().await?;
    seed_references(&db).await?;

    // the uuid for sf-2 is taken by an unrelated factor
    success_factors::ActiveModel {
        id: Set(factor_uuid("sf-2").to_string()),
        title: Set("Something else".to_string()),
        description: Set(String::new()),
        position: Set(3),
    }
    .insert(&db)
    .await?;

    let err = IdMigrationService::new(db.clone())
        .migrate_legacy_ids()
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::Collision { ref legacy_id, .. } if legacy_id == "sf-2"));

    // nothing from the failed run is committed
    assert!(success_factors::Entity::find_by_id("sf-1".to_string())
        .one(&db)
        .await?
        .is_some());
    let rating = success_factor_ratings::Entity::find().one(&db).await?.unwrap();
    assert_eq!(rating.factor_id, "sf-1");

    Ok(())
}

//! Service-level tests against a real SQLite database

use anyhow::Result;
use makeaplan::database::connection::{establish_connection, setup_database};
use makeaplan::domain::{TaskOrigin, TaskStage, TaskStatus};
use makeaplan::errors::CoreErrorKind;
use makeaplan::legacy_ids::factor_uuid;
use makeaplan::services::{
    CreateHeuristic, CreateOrganisation, CreatePolicy, CreateProject, CreateTask,
    HeuristicService, OrganisationService, PolicyService, ProjectService, RatingService,
    TaskFilter, TaskService, UpdateTask, UpsertRating,
};
use sea_orm::DatabaseConnection;
use tempfile::TempDir;
use tokio::task::JoinSet;
use uuid::Uuid;

async fn setup_test_db() -> Result<(DatabaseConnection, TempDir)> {
    let dir = tempfile::tempdir()?;
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("plans.db").display());

    let db = establish_connection(&db_url).await?;
    setup_database(&db).await?;

    Ok((db, dir))
}

async fn new_project(db: &DatabaseConnection, name: &str) -> Result<Uuid> {
    let project = ProjectService::new(db.clone())
        .create(CreateProject {
            name: name.to_string(),
            ..Default::default()
        })
        .await?;
    Ok(project.id)
}

async fn new_policy(db: &DatabaseConnection, project_id: Uuid, name: &str) -> Result<Uuid> {
    let policy = PolicyService::new(db.clone())
        .create(
            project_id,
            CreatePolicy {
                name: name.to_string(),
                description: None,
                organisation_id: None,
            },
        )
        .await?;
    Ok(policy.id)
}

fn task(text: &str, stage: TaskStage, origin: TaskOrigin, source_id: Option<String>) -> CreateTask {
    CreateTask {
        text: text.to_string(),
        stage,
        origin,
        source_id,
        completed: None,
        notes: None,
        priority: None,
        owner: None,
        status: None,
    }
}

#[tokio::test]
async fn test_every_resonance_round_trips() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let project_id = new_project(&db, "Ratings").await?;
    let ratings = RatingService::new(db.clone());

    for resonance in 1..=5 {
        let saved = ratings
            .upsert(
                project_id,
                UpsertRating {
                    factor_id: "sf-4".to_string(),
                    resonance,
                    notes: None,
                },
            )
            .await?;
        assert_eq!(saved.resonance, resonance);

        let stored = ratings.list(project_id).await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].resonance, resonance);
    }

    let err = ratings
        .upsert(
            project_id,
            UpsertRating {
                factor_id: "sf-99".to_string(),
                resonance: 3,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);

    Ok(())
}

#[tokio::test]
async fn test_task_cap_is_not_persisted_past_three() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let project_id = new_project(&db, "Cap").await?;
    let tasks = TaskService::new(db.clone());
    let source = Some(new_policy(&db, project_id, "Sign-off").await?.to_string());

    for n in 1..=3 {
        tasks
            .create(
                project_id,
                task(&format!("Step {}", n), TaskStage::Identification, TaskOrigin::Policy, source.clone()),
            )
            .await?;
    }

    let err = tasks
        .create(
            project_id,
            task("Step 4", TaskStage::Identification, TaskOrigin::Policy, source.clone()),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Conflict);

    let stored = tasks
        .list(
            project_id,
            TaskFilter {
                stage: Some(TaskStage::Identification),
                origin: Some(TaskOrigin::Policy),
                source_id: source.clone(),
            },
        )
        .await?;
    assert_eq!(stored.len(), 3);

    // moving a task into a full stage is refused too
    let other = tasks
        .create(
            project_id,
            task("Elsewhere", TaskStage::Closure, TaskOrigin::Policy, source.clone()),
        )
        .await?;
    let err = tasks
        .update(
            project_id,
            other.id,
            UpdateTask {
                stage: Some(TaskStage::Identification),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Conflict);

    Ok(())
}

#[tokio::test]
async fn test_legacy_and_uuid_factor_sources_share_one_cap() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let project_id = new_project(&db, "Factors").await?;
    let tasks = TaskService::new(db.clone());
    let canonical = factor_uuid("sf-1").to_string();

    for n in 1..=3 {
        let created = tasks
            .create(
                project_id,
                task(&format!("Step {}", n), TaskStage::Definition, TaskOrigin::Factor, Some("sf-1".to_string())),
            )
            .await?;
        assert_eq!(created.source_id.as_deref(), Some(canonical.as_str()));
    }

    let err = tasks
        .create(
            project_id,
            task("Step 4", TaskStage::Definition, TaskOrigin::Factor, Some(canonical.clone())),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Conflict);

    let stored = tasks
        .list(
            project_id,
            TaskFilter {
                stage: Some(TaskStage::Definition),
                origin: Some(TaskOrigin::Factor),
                source_id: Some(canonical),
            },
        )
        .await?;
    assert_eq!(stored.len(), 3);

    let err = tasks
        .create(
            project_id,
            task("Nowhere", TaskStage::Definition, TaskOrigin::Factor, Some("no-such-factor".to_string())),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);

    Ok(())
}

#[tokio::test]
async fn test_sources_must_exist_in_the_project() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let project_id = new_project(&db, "Home").await?;
    let other_project = new_project(&db, "Away").await?;
    let tasks = TaskService::new(db.clone());
    let foreign_policy = new_policy(&db, other_project, "Not ours").await?;

    let attempts = [
        (TaskOrigin::Policy, Uuid::new_v4().to_string()),
        (TaskOrigin::Policy, foreign_policy.to_string()),
        (TaskOrigin::Policy, "not-a-uuid".to_string()),
        (TaskOrigin::Heuristic, Uuid::new_v4().to_string()),
        (TaskOrigin::Framework, "waterfall-ish".to_string()),
    ];
    for (origin, source_id) in attempts {
        let err = tasks
            .create(project_id, task("Orphan", TaskStage::Delivery, origin, Some(source_id)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Validation);
    }
    assert!(tasks.list(project_id, TaskFilter::default()).await?.is_empty());

    let framework_task = tasks
        .create(
            project_id,
            task("Plan sprints", TaskStage::Delivery, TaskOrigin::Framework, Some(" Scrum ".to_string())),
        )
        .await?;
    assert_eq!(framework_task.source_id.as_deref(), Some("scrum"));

    Ok(())
}

#[tokio::test]
async fn test_concurrent_creates_respect_the_cap() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let project_id = new_project(&db, "Rush").await?;
    let tasks = TaskService::new(db.clone());
    let source = new_policy(&db, project_id, "Audit").await?.to_string();

    let mut set = JoinSet::new();
    for n in 0..8 {
        let tasks = tasks.clone();
        let input = task(&format!("Parallel {}", n), TaskStage::Closure, TaskOrigin::Policy, Some(source.clone()));
        set.spawn(async move { tasks.create(project_id, input).await });
    }

    let mut created = 0;
    let mut conflicts = 0;
    while let Some(joined) = set.join_next().await {
        match joined? {
            Ok(_) => created += 1,
            Err(err) => {
                assert_eq!(err.kind(), CoreErrorKind::Conflict, "unexpected failure: {}", err);
                conflicts += 1;
            }
        }
    }
    assert_eq!((created, conflicts), (3, 5));

    let stored = tasks
        .list(
            project_id,
            TaskFilter {
                source_id: Some(source),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(stored.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_custom_tasks_need_no_source() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let project_id = new_project(&db, "Custom").await?;
    let tasks = TaskService::new(db.clone());

    for n in 1..=4 {
        tasks
            .create(
                project_id,
                task(&format!("Custom {}", n), TaskStage::Delivery, TaskOrigin::Custom, None),
            )
            .await?;
    }

    let err = tasks
        .create(
            project_id,
            task("No source", TaskStage::Delivery, TaskOrigin::Heuristic, None),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);

    let done = tasks
        .create(
            project_id,
            CreateTask {
                status: Some(TaskStatus::Done),
                ..task("Already done", TaskStage::Closure, TaskOrigin::Custom, None)
            },
        )
        .await?;
    assert!(done.completed);
    assert_eq!(done.status, TaskStatus::Done.as_ref());

    Ok(())
}

#[tokio::test]
async fn test_policy_delete_cascades_to_its_tasks() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let project_id = new_project(&db, "Policies").await?;
    let policies = PolicyService::new(db.clone());
    let tasks = TaskService::new(db.clone());

    let policy = policies
        .create(
            project_id,
            CreatePolicy {
                name: "Change control".to_string(),
                description: None,
                organisation_id: None,
            },
        )
        .await?;
    let source = Some(policy.id.to_string());

    tasks
        .create(project_id, task("Log changes", TaskStage::Delivery, TaskOrigin::Policy, source.clone()))
        .await?;
    // any spelling of the policy id is stored canonically
    tasks
        .create(
            project_id,
            task("Audit changes", TaskStage::Delivery, TaskOrigin::Policy, Some(policy.id.to_string().to_uppercase())),
        )
        .await?;
    tasks
        .create(project_id, task("Review log", TaskStage::Closure, TaskOrigin::Policy, source.clone()))
        .await?;
    tasks
        .create(project_id, task("Unrelated", TaskStage::Closure, TaskOrigin::Custom, None))
        .await?;

    let removed = policies.delete(project_id, policy.id).await?;
    assert_eq!(removed, 3);

    assert!(policies.list(project_id).await?.is_empty());
    let remaining = tasks.list(project_id, TaskFilter::default()).await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].text, "Unrelated");

    let err = policies.delete(project_id, policy.id).await.unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::NotFound);

    Ok(())
}

#[tokio::test]
async fn test_heuristic_delete_cascades_to_its_tasks() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let project_id = new_project(&db, "Heuristics").await?;
    let heuristics = HeuristicService::new(db.clone());
    let tasks = TaskService::new(db.clone());

    let heuristic = heuristics
        .create(
            project_id,
            CreateHeuristic {
                name: "Show, don't tell".to_string(),
                description: None,
                factor_id: Some("sf-2".to_string()),
            },
        )
        .await?;
    assert_eq!(
        heuristic.factor_id.as_deref(),
        Some(makeaplan::legacy_ids::factor_uuid("sf-2").to_string().as_str())
    );

    tasks
        .create(
            project_id,
            task("Demo every week", TaskStage::Delivery, TaskOrigin::Heuristic, Some(format!("{{{}}}", heuristic.id))),
        )
        .await?;

    assert_eq!(heuristics.delete(project_id, heuristic.id).await?, 1);
    assert!(tasks.list(project_id, TaskFilter::default()).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_organisation_delete_removes_projects() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let organisations = OrganisationService::new(db.clone());
    let projects = ProjectService::new(db.clone());

    let organisation = organisations
        .create(CreateOrganisation {
            name: "Northwind".to_string(),
            description: None,
        })
        .await?;
    let project = projects
        .create(CreateProject {
            name: "Depot".to_string(),
            organisation_id: Some(organisation.id),
            ..Default::default()
        })
        .await?;

    organisations.delete(organisation.id).await?;

    let err = projects.get(project.id).await.unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::NotFound);

    let err = projects
        .create(CreateProject {
            name: "Orphan".to_string(),
            organisation_id: Some(organisation.id),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::NotFound);

    Ok(())
}

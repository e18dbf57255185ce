//! REST API integration tests

use anyhow::Result;
use axum::http::StatusCode;
use axum_test::TestServer;
use makeaplan::database::connection::{establish_connection, setup_database};
use makeaplan::legacy_ids::factor_uuid;
use makeaplan::server::app::create_app;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Test server over a fresh SQLite file. The directory must outlive the server.
async fn setup_test_server() -> Result<(TestServer, TempDir)> {
    let dir = tempfile::tempdir()?;
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display());

    let db = establish_connection(&db_url).await?;
    setup_database(&db).await?;

    let app = create_app(db, Some("http://localhost:5173")).await?;
    let server = TestServer::new(app)?;

    Ok((server, dir))
}

async fn create_project(server: &TestServer, name: &str) -> String {
    let response = server
        .post("/api/projects")
        .json(&json!({ "name": name, "userId": "user-1" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "makeaplan-server");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_projects_crud_api() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let project_id = create_project(&server, "Intranet relaunch").await;

    let projects: Vec<Value> = server.get("/api/projects").await.json();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["userId"], "user-1");

    let response = server
        .put(&format!("/api/projects/{}", project_id))
        .json(&json!({ "name": "Intranet v2", "description": "Second attempt" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let project: Value = response.json();
    assert_eq!(project["name"], "Intranet v2");
    assert_eq!(project["description"], "Second attempt");

    // creating a project also creates its plan
    let plan: Value = server
        .get(&format!("/api/projects/{}/plan", project_id))
        .await
        .json();
    assert_eq!(plan["projectId"], project_id.as_str());
    assert_eq!(plan["blocks"], json!({ "block1": {}, "block2": {}, "block3": {} }));

    let response = server
        .delete(&format!("/api/projects/{}", project_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server
        .get(&format!("/api/projects/{}", project_id))
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["fields"]["entity"], "Project");

    Ok(())
}

#[tokio::test]
async fn test_blank_project_name_is_rejected() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server
        .post("/api/projects")
        .json(&json!({ "name": "   " }))
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(body["error"]["fields"]["field"], "name");

    Ok(())
}

#[tokio::test]
async fn test_organisation_projects() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server
        .post("/api/organisations")
        .json(&json!({ "name": "Acme" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let organisation_id = response.json::<Value>()["id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/api/organisations/{}/projects", organisation_id))
        .json(&json!({ "name": "Warehouse move" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let project: Value = response.json();
    assert_eq!(project["organisationId"], organisation_id.as_str());

    let projects: Vec<Value> = server
        .get(&format!("/api/organisations/{}/projects", organisation_id))
        .await
        .json();
    assert_eq!(projects.len(), 1);

    // deleting the organisation takes its projects with it
    server
        .delete(&format!("/api/organisations/{}", organisation_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/projects/{}", project["id"].as_str().unwrap()))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_success_factor_catalog() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let factors: Vec<Value> = server.get("/api/success-factors").await.json();
    assert_eq!(factors.len(), 12);
    assert_eq!(factors[0]["id"], factor_uuid("sf-1").to_string());

    // legacy ids still resolve
    let factor: Value = server.get("/api/success-factors/sf-3").await.json();
    assert_eq!(factor["id"], factor_uuid("sf-3").to_string());

    server
        .get("/api/success-factors/not-a-factor")
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_rating_upsert_and_range() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let project_id = create_project(&server, "Ratings").await;
    let path = format!("/api/projects/{}/success-factor-ratings", project_id);

    let first: Value = server
        .post(&path)
        .json(&json!({ "factorId": "sf-1", "resonance": 2 }))
        .await
        .json();
    let second: Value = server
        .post(&path)
        .json(&json!({ "factorId": factor_uuid("sf-1").to_string(), "resonance": 4 }))
        .await
        .json();
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["resonance"], 4);

    let ratings: Vec<Value> = server.get(&path).await.json();
    assert_eq!(ratings.len(), 1);

    for resonance in [0, 6] {
        let response = server
            .post(&path)
            .json(&json!({ "factorId": "sf-2", "resonance": resonance }))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"]["fields"]["field"], "resonance");
    }

    let rating_id = second["id"].as_str().unwrap();
    let updated: Value = server
        .put(&format!("{}/{}", path, rating_id))
        .json(&json!({ "notes": "Sponsor is keen" }))
        .await
        .json();
    assert_eq!(updated["resonance"], 4);
    assert_eq!(updated["notes"], "Sponsor is keen");

    server
        .delete(&format!("{}/{}", path, rating_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn test_save_block_merges_and_normalizes() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let project_id = create_project(&server, "Blocks").await;
    let path = format!("/api/projects/{}/plan/blocks/block1", project_id);

    server
        .patch(&path)
        .json(&json!({ "successCriteria": "Fewer tickets", "notes": "draft" }))
        .await
        .assert_status_ok();

    let plan: Value = server
        .patch(&path)
        .json(&json!({ "successCriteria": "Half the tickets", "personalHeuristics": ["Ask early"] }))
        .await
        .json();

    let block = &plan["blocks"]["block1"];
    assert_eq!(block["successCriteria"], "Half the tickets");
    assert_eq!(block["notes"], "draft");
    assert_eq!(block["personalHeuristics"][0]["name"], "Ask early");
    assert_eq!(block["personalHeuristics"][0]["description"], "");
    assert!(block["personalHeuristics"][0]["id"].is_string());

    server
        .patch(&format!("/api/projects/{}/plan/blocks/block9", project_id))
        .json(&json!({}))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .patch(&path)
        .json(&json!(["not", "an", "object"]))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_fourth_task_is_a_conflict() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let project_id = create_project(&server, "Tasks").await;
    let path = format!("/api/projects/{}/tasks", project_id);
    let heuristic: Value = server
        .post(&format!("/api/projects/{}/heuristics", project_id))
        .json(&json!({ "name": "Ship small" }))
        .await
        .json();
    let source = heuristic["id"].as_str().unwrap_or_default().to_string();

    let response = server
        .post(&path)
        .json(&json!({
            "text": "Dangling",
            "stage": "definition",
            "origin": "heuristic",
            "sourceId": uuid::Uuid::new_v4().to_string(),
        }))
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["fields"]["field"], "sourceId");

    for n in 1..=3 {
        server
            .post(&path)
            .json(&json!({
                "text": format!("Task {}", n),
                "stage": "definition",
                "origin": "heuristic",
                "sourceId": source,
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .post(&path)
        .json(&json!({
            "text": "Task 4",
            "stage": "definition",
            "origin": "heuristic",
            "sourceId": source,
        }))
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"]["code"], "CONFLICT");

    let tasks: Vec<Value> = server
        .get(&path)
        .add_query_param("stage", "definition")
        .add_query_param("sourceId", &source)
        .await
        .json();
    assert_eq!(tasks.len(), 3);

    // a different stage has its own allowance
    server
        .post(&path)
        .json(&json!({
            "text": "Task 4",
            "stage": "delivery",
            "origin": "heuristic",
            "sourceId": source,
        }))
        .await
        .assert_status(StatusCode::CREATED);

    Ok(())
}

#[tokio::test]
async fn test_task_patch_syncs_status() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let project_id = create_project(&server, "Task status").await;
    let path = format!("/api/projects/{}/tasks", project_id);

    let task: Value = server
        .post(&path)
        .json(&json!({ "text": "Book rooms", "stage": "closure", "origin": "custom", "priority": "high" }))
        .await
        .json();
    assert_eq!(task["status"], "todo");
    assert_eq!(task["priority"], "high");

    let task: Value = server
        .patch(&format!("{}/{}", path, task["id"].as_str().unwrap()))
        .json(&json!({ "completed": true, "owner": "Sam" }))
        .await
        .json();
    assert_eq!(task["completed"], true);
    assert_eq!(task["status"], "done");
    assert_eq!(task["owner"], "Sam");

    Ok(())
}

#[tokio::test]
async fn test_frameworks_and_selection() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let project_id = create_project(&server, "Frameworks").await;

    let catalog: Vec<Value> = server.get("/api/frameworks").await.json();
    assert_eq!(catalog.len(), 8);

    let recommendation: Value = server
        .get("/api/frameworks/recommendations")
        .add_query_param("projectSize", "small")
        .add_query_param("pathClarity", "unclear")
        .await
        .json();
    assert!(!recommendation["frameworks"].as_array().unwrap().is_empty());

    let path = format!("/api/projects/{}/framework-selection", project_id);
    let empty: Value = server.get(&path).await.json();
    assert_eq!(empty["frameworkCodes"], json!([]));

    let saved: Value = server
        .put(&path)
        .json(&json!({ "frameworkCodes": ["scrum", "kanban"], "projectSize": "medium", "pathClarity": "emerging" }))
        .await
        .json();
    assert_eq!(saved["frameworkCodes"], json!(["scrum", "kanban"]));
    assert!(!saved["recommended"].as_array().unwrap().is_empty());

    server
        .put(&path)
        .json(&json!({ "frameworkCodes": ["astrology"] }))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_progress_endpoint() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let project_id = create_project(&server, "Progress").await;
    let ratings = format!("/api/projects/{}/success-factor-ratings", project_id);

    for (n, resonance) in [5, 4, 3, 2, 1].into_iter().enumerate() {
        server
            .post(&ratings)
            .json(&json!({ "factorId": format!("sf-{}", n + 1), "resonance": resonance }))
            .await
            .assert_status_ok();
    }

    let progress: Value = server
        .get(&format!("/api/projects/{}/plan/progress", project_id))
        .await
        .json();
    let discover = &progress["blocks"][0];
    assert_eq!(discover["block"], "block1");
    assert_eq!(discover["completedWeight"], 5);
    assert_eq!(discover["totalWeight"], 14);
    assert_eq!(discover["percentage"], 36);

    Ok(())
}

#[tokio::test]
async fn test_openapi_document_is_served() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let doc: Value = server.get("/api-docs/openapi.json").await.json();
    assert!(doc["paths"]["/api/projects/{project_id}/tasks"].is_object());

    Ok(())
}

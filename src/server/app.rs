use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, patch, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    frameworks, health, heuristics, organisations, plans, policies, projects, ratings,
    success_factors, tasks,
};
use super::openapi::ApiDoc;
use crate::services::{
    FrameworkService, HeuristicService, OrganisationService, PlanService, PolicyService,
    ProgressService, ProjectService, RatingService, SuccessFactorService, TaskService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub organisations: OrganisationService,
    pub projects: ProjectService,
    pub plans: PlanService,
    pub progress: ProgressService,
    pub success_factors: SuccessFactorService,
    pub ratings: RatingService,
    pub heuristics: HeuristicService,
    pub tasks: TaskService,
    pub policies: PolicyService,
    pub frameworks: FrameworkService,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            organisations: OrganisationService::new(db.clone()),
            projects: ProjectService::new(db.clone()),
            plans: PlanService::new(db.clone()),
            progress: ProgressService::new(db.clone()),
            success_factors: SuccessFactorService::new(db.clone()),
            ratings: RatingService::new(db.clone()),
            heuristics: HeuristicService::new(db.clone()),
            tasks: TaskService::new(db.clone()),
            policies: PolicyService::new(db.clone()),
            frameworks: FrameworkService::new(db.clone()),
            db,
        }
    }
}

pub async fn create_app(db: DatabaseConnection, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState::new(db);

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{}'", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    Ok(app)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Organisations
        .route(
            "/organisations",
            get(organisations::list_organisations).post(organisations::create_organisation),
        )
        .route(
            "/organisations/:organisation_id",
            get(organisations::get_organisation).delete(organisations::delete_organisation),
        )
        .route(
            "/organisations/:organisation_id/projects",
            get(organisations::list_organisation_projects)
                .post(organisations::create_organisation_project),
        )
        // Projects and their plan
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/:project_id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/projects/:project_id/plan", get(plans::get_plan))
        .route(
            "/projects/:project_id/plan/blocks/:block",
            patch(plans::save_block),
        )
        .route("/projects/:project_id/plan/progress", get(plans::get_progress))
        // Success factor catalog and ratings
        .route("/success-factors", get(success_factors::list_success_factors))
        .route(
            "/success-factors/:factor_id",
            get(success_factors::get_success_factor),
        )
        .route(
            "/projects/:project_id/success-factor-ratings",
            get(ratings::list_ratings).post(ratings::upsert_rating),
        )
        .route(
            "/projects/:project_id/success-factor-ratings/:rating_id",
            put(ratings::update_rating).delete(ratings::delete_rating),
        )
        // Heuristics, tasks and policies
        .route(
            "/projects/:project_id/heuristics",
            get(heuristics::list_heuristics).post(heuristics::create_heuristic),
        )
        .route(
            "/projects/:project_id/heuristics/:heuristic_id",
            put(heuristics::update_heuristic).delete(heuristics::delete_heuristic),
        )
        .route(
            "/projects/:project_id/tasks",
            get(tasks::list_tasks).post(tasks::create_task),
        )
        .route(
            "/projects/:project_id/tasks/:task_id",
            put(tasks::update_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/projects/:project_id/policies",
            get(policies::list_policies).post(policies::create_policy),
        )
        .route(
            "/projects/:project_id/policies/:policy_id",
            put(policies::update_policy).delete(policies::delete_policy),
        )
        // Frameworks
        .route(
            "/projects/:project_id/framework-selection",
            get(frameworks::get_selection).put(frameworks::save_selection),
        )
        .route("/frameworks", get(frameworks::list_frameworks))
        .route(
            "/frameworks/recommendations",
            get(frameworks::get_recommendations),
        )
}

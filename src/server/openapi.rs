use utoipa::OpenApi;

use super::handlers;
use crate::database::entities::{
    organisations, personal_heuristics, plans, policies, project_tasks, projects,
    success_factor_ratings, success_factors,
};
use crate::domain::{BlockId, PathClarity, ProjectSize, TaskOrigin, TaskPriority, TaskStage, TaskStatus};
use crate::frameworks::Framework;
use crate::services::{
    BlockProgress, CreateHeuristic, CreateOrganisation, CreatePolicy, CreateProject, CreateTask,
    FrameworkSelectionResponse, ProjectProgress, SaveFrameworkSelection, UpdateHeuristic,
    UpdatePolicy, UpdateProject, UpdateRating, UpdateTask, UpsertRating,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Make a Plan API", description = "Planning wizard persistence API"),
    paths(
        handlers::health::health_check,
        handlers::organisations::list_organisations,
        handlers::organisations::create_organisation,
        handlers::organisations::get_organisation,
        handlers::organisations::delete_organisation,
        handlers::organisations::list_organisation_projects,
        handlers::organisations::create_organisation_project,
        handlers::projects::list_projects,
        handlers::projects::create_project,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::plans::get_plan,
        handlers::plans::save_block,
        handlers::plans::get_progress,
        handlers::success_factors::list_success_factors,
        handlers::success_factors::get_success_factor,
        handlers::ratings::list_ratings,
        handlers::ratings::upsert_rating,
        handlers::ratings::update_rating,
        handlers::ratings::delete_rating,
        handlers::heuristics::list_heuristics,
        handlers::heuristics::create_heuristic,
        handlers::heuristics::update_heuristic,
        handlers::heuristics::delete_heuristic,
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,
        handlers::policies::list_policies,
        handlers::policies::create_policy,
        handlers::policies::update_policy,
        handlers::policies::delete_policy,
        handlers::frameworks::list_frameworks,
        handlers::frameworks::get_recommendations,
        handlers::frameworks::get_selection,
        handlers::frameworks::save_selection,
    ),
    components(schemas(
        organisations::Model,
        projects::Model,
        plans::Model,
        success_factors::Model,
        success_factor_ratings::Model,
        personal_heuristics::Model,
        project_tasks::Model,
        policies::Model,
        BlockId,
        TaskStage,
        TaskOrigin,
        TaskPriority,
        TaskStatus,
        ProjectSize,
        PathClarity,
        Framework,
        CreateOrganisation,
        CreateProject,
        UpdateProject,
        UpsertRating,
        UpdateRating,
        CreateHeuristic,
        UpdateHeuristic,
        CreateTask,
        UpdateTask,
        CreatePolicy,
        UpdatePolicy,
        SaveFrameworkSelection,
        FrameworkSelectionResponse,
        BlockProgress,
        ProjectProgress,
        handlers::frameworks::RecommendationResponse,
    )),
    tags(
        (name = "makeaplan", description = "Projects, plans and planning artefacts")
    )
)]
pub struct ApiDoc;

pub mod framework_selections;
pub mod organisations;
pub mod personal_heuristics;
pub mod plans;
pub mod policies;
pub mod project_tasks;
pub mod projects;
pub mod success_factor_ratings;
pub mod success_factors;

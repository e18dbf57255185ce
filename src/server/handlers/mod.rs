pub mod frameworks;
pub mod health;
pub mod heuristics;
pub mod organisations;
pub mod plans;
pub mod policies;
pub mod projects;
pub mod ratings;
pub mod success_factors;
pub mod tasks;

pub mod client;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod frameworks;
pub mod legacy_ids;
pub mod progress;
pub mod services;

#[cfg(feature = "server")]
pub mod server;

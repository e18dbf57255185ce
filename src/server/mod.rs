pub mod app;
pub mod error;
pub mod handlers;
pub mod openapi;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::database::{connection::*, migrations::Migrator, seed_data};

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(port: u16, database_path: &str, cors_origin: Option<&str>) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    setup_database(&db).await?;
    info!("Database ready at {}", database_path);

    let app = app::create_app(db, cors_origin).await?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                                 - Health check");
    info!("  /docs                                   - Swagger UI documentation");
    info!("  /api/organisations                      - Organisations and their projects");
    info!("  /api/projects/:id                       - Projects");
    info!("  /api/projects/:id/plan                  - Plan blocks and progress");
    info!("  /api/projects/:id/success-factor-ratings");
    info!("  /api/projects/:id/heuristics");
    info!("  /api/projects/:id/tasks");
    info!("  /api/projects/:id/policies");
    info!("  /api/projects/:id/framework-selection");
    info!("  /api/success-factors, /api/frameworks   - Static catalogs");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    if !matches!(direction, MigrateDirection::Down) {
        seed_data::seed_success_factors(&db).await?;
    }

    info!("Database migration completed");
    Ok(())
}

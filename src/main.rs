use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use makeaplan::config::{self, ServerConfig};
use makeaplan::database::{establish_connection, get_database_url, setup_database};
use makeaplan::domain::{PathClarity, ProjectSize};
use makeaplan::frameworks;
use makeaplan::server::{self, MigrateDirection};
use makeaplan::services::IdMigrationService;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API
    Serve {
        /// Defaults to $MAKEAPLAN_PORT, then 3000
        #[clap(short, long)]
        port: Option<u16>,
        /// Defaults to $MAKEAPLAN_DATABASE, then makeaplan.db
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    /// Print the frameworks recommended for a project profile
    Recommend {
        #[clap(long)]
        project_size: ProjectSize,
        #[clap(long)]
        path_clarity: PathClarity,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    /// Create the schema and seed the success factor catalog
    Init {
        #[clap(short, long)]
        database: Option<String>,
    },
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
        #[clap(short, long)]
        database: Option<String>,
    },
    /// Rewrite legacy sf-N success factor ids to UUIDs
    MigrateLegacyIds {
        #[clap(short, long)]
        database: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Serve {
            port,
            database,
            cors_origin,
        } => {
            let config = ServerConfig::resolve(port, database, cors_origin)?;
            info!("Starting server on port {}", config.port);
            server::start_server(config.port, &config.database, config.cors_origin.as_deref())
                .await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                let database = config::database_path(database);
                info!("Initializing database: {}", database);
                let db = establish_connection(&get_database_url(Some(&database))).await?;
                setup_database(&db).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Running database migration: {:?}", direction);
                server::migrate_database(&config::database_path(database), direction).await?;
            }
            DbCommands::MigrateLegacyIds { database } => {
                let database = config::database_path(database);
                let db = establish_connection(&get_database_url(Some(&database))).await?;
                setup_database(&db).await?;
                let report = IdMigrationService::new(db).migrate_legacy_ids().await?;
                for (legacy_id, new_id) in &report.factors {
                    info!("  {} -> {}", legacy_id, new_id);
                }
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        },
        Commands::Recommend {
            project_size,
            path_clarity,
        } => {
            for code in frameworks::recommend(project_size, path_clarity) {
                match frameworks::find(code) {
                    Some(framework) => println!("{:<16} {}", framework.code, framework.name),
                    None => println!("{}", code),
                }
            }
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_deref()
        .unwrap_or("info")
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}

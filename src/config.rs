//! Runtime settings resolved from command-line flags with environment
//! fallbacks.

use anyhow::{Context, Result};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE: &str = "makeaplan.db";

pub const DATABASE_ENV: &str = "MAKEAPLAN_DATABASE";
pub const PORT_ENV: &str = "MAKEAPLAN_PORT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub database: String,
    pub cors_origin: Option<String>,
}

impl ServerConfig {
    /// Flags win over the environment, the environment over defaults.
    pub fn resolve(
        port: Option<u16>,
        database: Option<String>,
        cors_origin: Option<String>,
    ) -> Result<Self> {
        Self::resolve_with(port, database, cors_origin, |name| std::env::var(name).ok())
    }

    pub fn resolve_with<F>(
        port: Option<u16>,
        database: Option<String>,
        cors_origin: Option<String>,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match port {
            Some(port) => port,
            None => match env(PORT_ENV) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{} must be a port number, got '{}'", PORT_ENV, raw))?,
                None => DEFAULT_PORT,
            },
        };

        Ok(Self {
            port,
            database: database_path_with(database, &env),
            cors_origin,
        })
    }
}

/// Database path for commands that only need the store.
pub fn database_path(database: Option<String>) -> String {
    database_path_with(database, &|name: &str| std::env::var(name).ok())
}

fn database_path_with<F>(database: Option<String>, env: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    database
        .or_else(|| env(DATABASE_ENV).filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_flags_or_env() {
        let config = ServerConfig::resolve_with(None, None, None, no_env).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database, DEFAULT_DATABASE);
    }

    #[test]
    fn environment_fills_missing_flags() {
        let env = |name: &str| match name {
            PORT_ENV => Some("8080".to_string()),
            DATABASE_ENV => Some("/var/lib/plans.db".to_string()),
            _ => None,
        };
        let config = ServerConfig::resolve_with(None, None, None, env).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database, "/var/lib/plans.db");

        let config =
            ServerConfig::resolve_with(Some(9000), Some("local.db".into()), None, env).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.database, "local.db");
    }

    #[test]
    fn invalid_port_in_env_is_an_error() {
        let env = |name: &str| (name == PORT_ENV).then(|| "http".to_string());
        assert!(ServerConfig::resolve_with(None, None, None, env).is_err());
    }
}

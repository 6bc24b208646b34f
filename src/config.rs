use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Config {
    /// Loads `config.toml` (path overridable via CONFIG_PATH). When the file
    /// is missing the config is built entirely from environment variables;
    /// when present, environment variables still override its values.
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("failed to parse {config_path}: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // DATABASE_URL is the only setting without a sane default
                let database_url = env::var("DATABASE_URL")
                    .map_err(|_| "missing DATABASE_URL and no config.toml found")?;

                Config {
                    server: ServerConfig {
                        host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                        port: env::var("SERVER_PORT")
                            .ok()
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(8080),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: env::var("DB_MAX_CONNECTIONS")
                            .ok()
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(10),
                    },
                }
            }
            Err(e) => {
                return Err(format!("failed to read config file {config_path}: {e}").into());
            }
        };

        // env overrides apply even when the file exists
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }

        Ok(config)
    }
}

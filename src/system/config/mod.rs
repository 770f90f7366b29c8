use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::shared::utils::date_util::{DateUtil, Duration, DurationParseError};

pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
    #[error("invalid duration for {key}: {source}")]
    InvalidDuration {
        key: String,
        #[source]
        source: DurationParseError,
    },
    #[error("JWT_SECRET must be set when running in production")]
    InsecureSecret,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub connection_timeout: u64,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connection_string(&self) -> String {
        if let Some(uri) = &self.uri {
            return uri.clone();
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => format!(
                "mongodb://{}:{}@{}:{}/{}",
                username, password, self.host, self.port, self.database
            ),
            _ => format!("mongodb://{}:{}/{}", self.host, self.port, self.database),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                workers: 4,
            },
            log: LogConfig {
                level: "info".to_string(),
            },
            database: None,
            auth: AuthConfig {
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                access_token_ttl: Duration::days(1),
                refresh_token_ttl: Duration::days(7),
                bcrypt_cost: 10,
            },
            environment: "development".to_string(),
        }
    }
}

/// Lookup over the process environment first, then values read from env files.
struct EnvSource<'a> {
    process_env: &'a dyn Fn(&str) -> Option<String>,
    file_values: HashMap<String, String>,
}

impl EnvSource<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.process_env)(key).or_else(|| self.file_values.get(key).cloned())
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            Some(value) => value
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value,
                }),
            None => Ok(None),
        }
    }

    fn duration(&self, key: &str) -> Result<Option<Duration>, ConfigError> {
        match self.get(key) {
            Some(value) => DateUtil::parse_duration(&value).map(Some).map_err(|source| {
                ConfigError::InvalidDuration {
                    key: key.to_string(),
                    source,
                }
            }),
            None => Ok(None),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("configs"), &|key| env::var(key).ok())
    }

    /// Load configuration from `dir`, layering `.env.default`, `.env.{APP_ENV}`
    /// and `.env.local`, with `process_env` taking precedence over all files.
    pub fn load_from(
        dir: &Path,
        process_env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let environment = process_env("APP_ENV").unwrap_or_else(|| "development".to_string());

        let env_files = [
            ".env.default".to_string(),
            format!(".env.{}", environment),
            ".env.local".to_string(),
        ];

        let mut file_values = HashMap::new();
        for name in env_files {
            let path = dir.join(name);
            if path.exists() {
                file_values.extend(parse_env_file(&path)?);
            }
        }

        let source = EnvSource {
            process_env,
            file_values,
        };

        let mut config = AppConfig {
            environment,
            ..AppConfig::default()
        };
        config.apply(&source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    fn apply(&mut self, source: &EnvSource<'_>) -> Result<(), ConfigError> {
        // Server config
        if let Some(host) = source.get("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = source.parse("SERVER_PORT")? {
            self.server.port = port;
        }
        if let Some(workers) = source.parse("SERVER_WORKERS")? {
            self.server.workers = workers;
        }

        if let Some(level) = source.get("LOG_LEVEL") {
            self.log.level = level;
        }

        // Database config: either a full URI or discrete DB_* settings
        let uri = source.get("MONGODB_URI");
        let host = source.get("DB_HOST");
        if uri.is_some() || host.is_some() {
            self.database = Some(DatabaseConfig {
                uri,
                host: host.unwrap_or_else(|| "localhost".to_string()),
                port: source.parse("DB_PORT")?.unwrap_or(27017),
                database: source
                    .get("DB_DATABASE")
                    .unwrap_or_else(|| "superapp".to_string()),
                username: source.get("DB_USERNAME"),
                password: source.get("DB_PASSWORD"),
                connection_timeout: source.parse("DB_CONNECTION_TIMEOUT")?.unwrap_or(10),
                max_connections: source.parse("DB_MAX_CONNECTIONS")?.unwrap_or(10),
            });
        }

        // Auth config
        if let Some(secret) = source.get("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = source.duration("JWT_EXPIRES_IN")? {
            self.auth.access_token_ttl = ttl;
        }
        if let Some(ttl) = source.duration("JWT_REFRESH_EXPIRES_IN")? {
            self.auth.refresh_token_ttl = ttl;
        }
        if let Some(cost) = source.parse("BCRYPT_COST")? {
            self.auth.bcrypt_cost = cost;
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.auth.jwt_secret == DEFAULT_JWT_SECRET {
            return Err(ConfigError::InsecureSecret);
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST".to_string(),
                value: self.auth.bcrypt_cost.to_string(),
            });
        }
        if self.server.workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SERVER_WORKERS".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut values = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);

            values.insert(key.trim().to_string(), value.to_string());
        }
    }

    Ok(values)
}

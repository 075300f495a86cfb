use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    /// Exposes withheld failure detail in fallback error bodies
    pub debug: bool,
    /// Mount point of the versioned API; empty mounts it at the root
    pub api_prefix: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string
    pub filter: String,
    pub format: LogFormat,
    /// Directory for the daily error log file; `None` disables it
    pub error_log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfig {
    Any,
    Origins(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            other => bail!("unknown environment '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => bail!("unknown log format '{other}'"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_source(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process env
    pub fn from_source<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment: Environment = get("ENVIRONMENT")
            .as_deref()
            .unwrap_or("development")
            .parse()
            .context("ENVIRONMENT must be development, testing or production")?;

        let debug = match get("DEBUG") {
            Some(value) => parse_bool(&value).context("DEBUG must be true or false")?,
            None => false,
        };

        let format = match get("LOG_FORMAT") {
            Some(value) => value.parse().context("LOG_FORMAT must be json or pretty")?,
            None if environment == Environment::Production => LogFormat::Json,
            None => LogFormat::Pretty,
        };

        let filter = get("LOG_LEVEL").unwrap_or_else(|| match environment {
            Environment::Development => "debug,teamon_api=debug".to_string(),
            _ => "info,teamon_api=debug".to_string(),
        });

        Ok(Config {
            server: ServerConfig {
                host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get("API_PORT")
                    .unwrap_or_else(|| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
                // Used only for observability. Falls back to HOSTNAME (set by
                // Docker/Kubernetes), otherwise "unknown".
                instance_id: get("INSTANCE_ID")
                    .or_else(|| get("HOSTNAME"))
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            app: AppConfig {
                environment,
                debug,
                api_prefix: parse_prefix(get("API_V1_PREFIX").as_deref().unwrap_or("/api/v1"))
                    .context("API_V1_PREFIX must be empty or start with '/'")?,
            },
            logging: LoggingConfig {
                filter,
                format,
                error_log_dir: match get("ERROR_LOG_DIR") {
                    Some(dir) if dir.trim().is_empty() => None,
                    Some(dir) => Some(PathBuf::from(dir.trim())),
                    None => Some(PathBuf::from("logs")),
                },
            },
            cors: parse_cors(get("CORS_ORIGINS").as_deref().unwrap_or("*")),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("'{other}' is not a boolean"),
    }
}

fn parse_prefix(value: &str) -> Result<String> {
    let prefix = value.trim().trim_end_matches('/');
    if !prefix.is_empty() && !prefix.starts_with('/') {
        bail!("'{prefix}' is not an absolute path");
    }
    Ok(prefix.to_string())
}

fn parse_cors(value: &str) -> CorsConfig {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        CorsConfig::Any
    } else {
        CorsConfig::Origins(origins)
    }
}

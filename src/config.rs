use crate::error::{Error, Result};
use crate::policy::PermissionNaming;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

/// `DATABASE_URL` value selecting the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub permission_template: String,
    pub public_url: Option<String>,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let permission_template = env::var("PERMISSION_TEMPLATE")
            .unwrap_or_else(|_| PermissionNaming::DEFAULT_TEMPLATE.to_string());
        PermissionNaming::new(&permission_template)?;

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(other) => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: get_env("JWT_SECRET")?,
            token_ttl_minutes: get_env_parse_or("TOKEN_TTL_MINUTES", 60)?,
            permission_template,
            public_url: env::var("PUBLIC_URL").ok().filter(|url| !url.is_empty()),
            log_format,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<&'static Config> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    get_config()
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}

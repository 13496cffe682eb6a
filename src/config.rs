use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

use crate::model::person::Person;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    MySql,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(StorageBackend::MySql),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("STORAGE must be 'mysql' or 'memory', got '{}'", other),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Directory name cache
    pub name_cache_capacity: u64,
    pub name_cache_ttl_secs: u64,

    pub log_dir: String,

    /// Directory seeded into the in-memory backend
    pub memory_personnel: Vec<Person>,
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

/// `cedula=Full Name` pairs separated by commas.
fn parse_personnel(raw: &str) -> Result<Vec<Person>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((cedula, name)) if !cedula.trim().is_empty() && !name.trim().is_empty() => {
                Ok(Person::new(cedula.trim(), name.trim()))
            }
            _ => bail!("MEMORY_PERSONNEL entry '{}' must look like cedula=Full Name", pair),
        })
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let storage = match env::var("STORAGE") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::MySql,
        };

        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageBackend::MySql && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE=mysql");
        }

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            storage,
            database_url,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", 1000)?,
            name_cache_capacity: var_or("NAME_CACHE_CAPACITY", 10_000)?,
            name_cache_ttl_secs: var_or("NAME_CACHE_TTL_SECS", 300)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            memory_personnel: match env::var("MEMORY_PERSONNEL") {
                Ok(raw) => parse_personnel(&raw)?,
                Err(_) => Vec::new(),
            },
        })
    }
}

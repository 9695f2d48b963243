use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

const DEFAULT_DB_NAME: &str = "trailtalk";
const DEFAULT_PORT: u16 = 5002;
const DEFAULT_UPLOAD_MAX_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongo_uri: String,
    pub db_name: String,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let mongo_uri = get_required("MONGO_URI").context("MONGO_URI is required")?;
        let db_name = get_optional("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        let http_addr = match get_optional("HTTP_ADDR") {
            Some(addr) => addr,
            None => {
                let port: u16 = get_optional("PORT")
                    .unwrap_or_else(|| DEFAULT_PORT.to_string())
                    .parse()
                    .context("Failed to parse PORT, expecting 0..65535")?;
                format!("0.0.0.0:{port}")
            }
        };
        let cors_origins =
            parse_cors_origins(std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());

        let upload_dir =
            PathBuf::from(get_optional("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()));
        let upload_max_bytes = parse_usize_env("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES)?;
        let http_request_body_limit_bytes = parse_usize_env(
            "HTTP_REQUEST_BODY_LIMIT_BYTES",
            upload_max_bytes.saturating_add(1024 * 1024),
        )?;
        if http_request_body_limit_bytes < upload_max_bytes {
            return Err(anyhow!(
                "HTTP_REQUEST_BODY_LIMIT_BYTES must be >= UPLOAD_MAX_BYTES"
            ));
        }
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 60)?;

        Ok(Self {
            mongo_uri,
            db_name,
            http_addr,
            cors_origins,
            log_level,
            upload_dir,
            upload_max_bytes,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn get_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    parse_positive(key, std::env::var(key).ok(), default)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    parse_positive(key, std::env::var(key).ok(), default)
}

fn parse_positive<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr + PartialEq + Default + ToString,
{
    let value = raw
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse::<T>()
        .map_err(|_| anyhow!("Failed to parse {key}, expecting positive integer"))?;

    if value == T::default() {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

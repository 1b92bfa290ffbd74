use std::env;
use std::path::PathBuf;

use crate::report_fetch::DEFAULT_DAILY_DAYS;
use crate::source::Gender;

const DEFAULT_DATA_BASE: &str = "/data";
const DEFAULT_API_BASE: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const CONFIG_DIR: &str = "toplines_terminal";
pub const FILTERS_FILE: &str = "toplines-filters-v1.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_base: String,
    pub api_base: String,
    pub gender: Gender,
    pub days: u32,
    pub http_timeout_secs: u64,
    pub filters_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_base: DEFAULT_DATA_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            gender: Gender::Men,
            days: DEFAULT_DAILY_DAYS,
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            filters_path: None,
        }
    }
}

impl Config {
    /// Loads `.env.local` / `.env` when present, then reads the environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        Self {
            data_base: resolve_data_base(),
            api_base: non_empty_env("TOPLINES_API_BASE")
                .map(|v| strip_trailing_slash(&v))
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            gender: non_empty_env("TOPLINES_GENDER")
                .and_then(|v| Gender::parse(&v))
                .unwrap_or_default(),
            days: days_from_env(),
            http_timeout_secs: http_timeout_from_env(),
            filters_path: filters_path_from_env(),
        }
    }
}

pub fn strip_trailing_slash(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.trim_end_matches('/');
    if stripped.is_empty() && trimmed.starts_with('/') {
        return "/".to_string();
    }
    stripped.to_string()
}

pub fn http_timeout_from_env() -> u64 {
    non_empty_env("TOPLINES_HTTP_TIMEOUT_SECS")
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
        .max(1)
}

fn days_from_env() -> u32 {
    non_empty_env("TOPLINES_DAYS")
        .and_then(|val| val.parse::<u32>().ok())
        .unwrap_or(DEFAULT_DAILY_DAYS)
        .clamp(1, 30)
}

// Same candidate order the dev server used to locate generated data.
fn resolve_data_base() -> String {
    if let Some(base) = non_empty_env("TOPLINES_DATA_BASE") {
        return strip_trailing_slash(&base);
    }
    if let Some(path) = non_empty_env("DATA_PATH") {
        return strip_trailing_slash(&path);
    }
    if let Some(home) = non_empty_env("DAGSTER_HOME") {
        let path = PathBuf::from(home).join("data").join("web");
        return strip_trailing_slash(&path.to_string_lossy());
    }
    DEFAULT_DATA_BASE.to_string()
}

fn filters_path_from_env() -> Option<PathBuf> {
    if let Some(path) = non_empty_env("TOPLINES_FILTERS_PATH") {
        return Some(PathBuf::from(path));
    }
    if let Some(base) = non_empty_env("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(base).join(CONFIG_DIR).join(FILTERS_FILE));
    }
    let home = non_empty_env("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR)
            .join(FILTERS_FILE),
    )
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

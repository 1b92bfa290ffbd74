use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use reqwest::header::CACHE_CONTROL;

use crate::config::strip_trailing_slash;
use crate::http_client::http_client;

/// Where snapshot JSON comes from. Paths are relative to the data root,
/// e.g. `men/daily/2025-12-20_3d.json`.
pub trait DataSource: Send + Sync {
    fn fetch_text(&self, rel_path: &str) -> Result<String>;

    /// Same as `fetch_text` but bypasses intermediate caches where the
    /// transport has any.
    fn fetch_text_uncached(&self, rel_path: &str) -> Result<String> {
        self.fetch_text(rel_path)
    }

    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gender {
    #[default]
    Men,
    Women,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Men => "men",
            Gender::Women => "women",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "men" | "m" | "mens" => Some(Gender::Men),
            "women" | "w" | "womens" => Some(Gender::Women),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Gender::Men => Gender::Women,
            Gender::Women => Gender::Men,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn daily_path(gender: Gender, date: &str, days: u32) -> String {
    format!("{gender}/daily/{date}_{days}d.json")
}

pub fn rankings_path(gender: Gender, date: &str) -> String {
    format!("{gender}/rankings/{date}.json")
}

pub fn schedule_path(gender: Gender, date: &str) -> String {
    format!("{gender}/schedule/{date}.json")
}

pub fn toplines_path(gender: Gender, date: &str) -> String {
    format!("{gender}/toplines/{date}.json")
}

pub fn conferences_path(gender: Gender) -> String {
    format!("{gender}/conferences.json")
}

/// Picks the HTTP source for `http(s)://` roots and the directory source
/// for everything else.
pub fn source_for_root(root: &str) -> Arc<dyn DataSource> {
    let root = strip_trailing_slash(root);
    if root.starts_with("http://") || root.starts_with("https://") {
        Arc::new(HttpSource::new(root))
    } else {
        Arc::new(DirSource::new(root))
    }
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    base: String,
}

impl HttpSource {
    pub fn new(base: impl AsRef<str>) -> Self {
        Self {
            base: strip_trailing_slash(base.as_ref()),
        }
    }

    pub fn url_for(&self, rel_path: &str) -> String {
        format!("{}/{}", self.base, rel_path.trim_start_matches('/'))
    }

    fn get(&self, rel_path: &str, no_store: bool) -> Result<String> {
        let client = http_client()?;
        let url = self.url_for(rel_path);
        let mut req = client.get(&url);
        if no_store {
            req = req.header(CACHE_CONTROL, "no-store");
        }
        let resp = req.send().with_context(|| format!("request failed: {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP {}", status.as_u16()));
        }
        resp.text().context("failed reading body")
    }
}

impl DataSource for HttpSource {
    fn fetch_text(&self, rel_path: &str) -> Result<String> {
        self.get(rel_path, false)
    }

    fn fetch_text_uncached(&self, rel_path: &str) -> Result<String> {
        self.get(rel_path, true)
    }

    fn describe(&self) -> String {
        self.base.clone()
    }
}

/// Serves snapshots straight from the generated `data/web` directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DataSource for DirSource {
    fn fetch_text(&self, rel_path: &str) -> Result<String> {
        let rel = rel_path.trim_start_matches('/');
        if rel.split('/').any(|part| part == "..") {
            return Err(anyhow!("HTTP 400"));
        }
        let path = self.root.join(rel);
        match fs::read_to_string(&path) {
            Ok(body) => Ok(body),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(anyhow!("HTTP 404")),
            Err(err) => {
                Err(err).with_context(|| format!("failed reading {}", path.display()))
            }
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// In-memory source keyed by relative path. Unknown paths answer 404.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    entries: HashMap<String, (u16, String)>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, rel_path: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(rel_path, 200, body);
        self
    }

    pub fn with_status(mut self, rel_path: impl Into<String>, status: u16) -> Self {
        self.insert(rel_path, status, String::new());
        self
    }

    pub fn insert(&mut self, rel_path: impl Into<String>, status: u16, body: impl Into<String>) {
        self.entries.insert(rel_path.into(), (status, body.into()));
    }
}

impl DataSource for StaticSource {
    fn fetch_text(&self, rel_path: &str) -> Result<String> {
        let Some((status, body)) = self.entries.get(rel_path.trim_start_matches('/')) else {
            return Err(anyhow!("HTTP 404"));
        };
        if !(200..300).contains(status) {
            return Err(anyhow!("HTTP {status}"));
        }
        Ok(body.clone())
    }

    fn describe(&self) -> String {
        format!("static ({} entries)", self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_snapshot_layout() {
        assert_eq!(
            daily_path(Gender::Men, "2025-12-20", 3),
            "men/daily/2025-12-20_3d.json"
        );
        assert_eq!(
            rankings_path(Gender::Women, "2025-12-20"),
            "women/rankings/2025-12-20.json"
        );
        assert_eq!(
            schedule_path(Gender::Men, "2025-12-20"),
            "men/schedule/2025-12-20.json"
        );
        assert_eq!(
            toplines_path(Gender::Men, "2025-12-20"),
            "men/toplines/2025-12-20.json"
        );
        assert_eq!(conferences_path(Gender::Women), "women/conferences.json");
    }

    #[test]
    fn http_source_joins_without_double_slash() {
        let source = HttpSource::new("http://localhost:5174/data/");
        assert_eq!(
            source.url_for("men/conferences.json"),
            "http://localhost:5174/data/men/conferences.json"
        );
    }

    #[test]
    fn static_source_reports_status() {
        let source = StaticSource::new()
            .with_json("a.json", "{}")
            .with_status("b.json", 500);
        assert_eq!(source.fetch_text("a.json").unwrap(), "{}");
        assert_eq!(source.fetch_text("b.json").unwrap_err().to_string(), "HTTP 500");
        assert_eq!(source.fetch_text("c.json").unwrap_err().to_string(), "HTTP 404");
    }

    #[test]
    fn gender_parses_loosely() {
        assert_eq!(Gender::parse(" Women "), Some(Gender::Women));
        assert_eq!(Gender::parse("men"), Some(Gender::Men));
        assert_eq!(Gender::parse("mixed"), None);
        assert_eq!(Gender::Men.toggle(), Gender::Women);
    }
}

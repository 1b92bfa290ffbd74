use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;

const FILTERS_VERSION: u32 = 1;

/// UI filter selections shared by the report and schedule screens.
///
/// Every field decodes on its own: a missing or wrong-typed value becomes
/// the neutral default rather than discarding the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPrefs {
    #[serde(default, deserialize_with = "lenient::string_vec")]
    pub selected_classes: Vec<String>,
    #[serde(default, deserialize_with = "lenient::bool_or_default")]
    pub rsci_only: bool,
    #[serde(default, deserialize_with = "lenient::string_or_default")]
    pub selected_position: String,
    #[serde(default, deserialize_with = "lenient::string_vec")]
    pub selected_conferences: Vec<String>,
    #[serde(default, deserialize_with = "lenient::bool_or_default")]
    pub featured_only: bool,
    #[serde(default, deserialize_with = "lenient::bool_or_default")]
    pub sort_desc: bool,
    #[serde(default, deserialize_with = "lenient::string_vec")]
    pub schedule_statuses: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_vec")]
    pub topline_dates: Vec<String>,
    /// `None` means unset; callers pick their own date.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub schedule_date: Option<String>,
}

/// A partial update. `None` leaves the persisted value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub selected_classes: Option<Vec<String>>,
    pub rsci_only: Option<bool>,
    pub selected_position: Option<String>,
    pub selected_conferences: Option<Vec<String>>,
    pub featured_only: Option<bool>,
    pub sort_desc: Option<bool>,
    pub schedule_statuses: Option<Vec<String>>,
    pub topline_dates: Option<Vec<String>>,
    pub schedule_date: Option<Option<String>>,
}

impl FilterPrefs {
    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(v) = patch.selected_classes {
            self.selected_classes = dedup_keep_order(v);
        }
        if let Some(v) = patch.rsci_only {
            self.rsci_only = v;
        }
        if let Some(v) = patch.selected_position {
            self.selected_position = v;
        }
        if let Some(v) = patch.selected_conferences {
            self.selected_conferences = dedup_keep_order(v);
        }
        if let Some(v) = patch.featured_only {
            self.featured_only = v;
        }
        if let Some(v) = patch.sort_desc {
            self.sort_desc = v;
        }
        if let Some(v) = patch.schedule_statuses {
            self.schedule_statuses = dedup_keep_order(v);
        }
        if let Some(v) = patch.topline_dates {
            self.topline_dates = dedup_keep_order(v);
        }
        if let Some(v) = patch.schedule_date {
            self.schedule_date = v.filter(|d| !d.trim().is_empty());
        }
    }
}

impl From<FilterPrefs> for FilterPatch {
    fn from(prefs: FilterPrefs) -> Self {
        Self {
            selected_classes: Some(prefs.selected_classes),
            rsci_only: Some(prefs.rsci_only),
            selected_position: Some(prefs.selected_position),
            selected_conferences: Some(prefs.selected_conferences),
            featured_only: Some(prefs.featured_only),
            sort_desc: Some(prefs.sort_desc),
            schedule_statuses: Some(prefs.schedule_statuses),
            topline_dates: Some(prefs.topline_dates),
            schedule_date: Some(prefs.schedule_date),
        }
    }
}

// Class and conference selections behave like sets.
fn dedup_keep_order(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct StoredFilters<'a> {
    version: u32,
    filters: &'a FilterPrefs,
}

/// Best-effort persistence of `FilterPrefs` in a single versioned JSON file.
/// Without a path the store reads defaults and drops writes.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    path: Option<PathBuf>,
}

impl FilterStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> FilterPrefs {
        let Some(path) = self.path.as_deref() else {
            return FilterPrefs::default();
        };
        read_filters(path).unwrap_or_default()
    }

    /// Merges `patch` over the last saved record and writes the result.
    /// Returns the merged record whether or not the write succeeded.
    pub fn save(&self, patch: FilterPatch) -> FilterPrefs {
        let mut prefs = self.load();
        self.save_into(&mut prefs, patch);
        prefs
    }

    /// Applies `patch` to the caller's live record, then persists it. A
    /// missing path or failed write leaves `current` updated in memory.
    pub fn save_into(&self, current: &mut FilterPrefs, patch: FilterPatch) {
        current.apply(patch);
        if let Some(path) = self.path.as_deref() {
            let _ = write_filters(path, current);
        }
    }
}

fn read_filters(path: &Path) -> Option<FilterPrefs> {
    let raw = fs::read_to_string(path).ok()?;
    let root: Value = serde_json::from_str(&raw).ok()?;
    let version = root.get("version").and_then(Value::as_u64)?;
    if version != u64::from(FILTERS_VERSION) {
        return None;
    }
    let filters = root.get("filters")?.clone();
    if !filters.is_object() {
        return None;
    }
    serde_json::from_value(filters).ok()
}

fn write_filters(path: &Path, prefs: &FilterPrefs) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let json = serde_json::to_string_pretty(&StoredFilters {
        version: FILTERS_VERSION,
        filters: prefs,
    })
    .context("serialize filters")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write filters")?;
    fs::rename(&tmp, path).context("swap filters")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_typed_fields_get_neutral_defaults() {
        let prefs: FilterPrefs = serde_json::from_value(json!({
            "selectedClasses": "freshman",
            "rsciOnly": 1,
            "selectedPosition": 5,
            "selectedConferences": ["ACC", 2],
            "sortDesc": true,
            "scheduleDate": 20251220
        }))
        .unwrap();
        assert!(prefs.selected_classes.is_empty());
        assert!(!prefs.rsci_only);
        assert_eq!(prefs.selected_position, "");
        assert_eq!(prefs.selected_conferences, vec!["ACC".to_string()]);
        assert!(prefs.sort_desc);
        assert_eq!(prefs.schedule_date, None);
    }

    #[test]
    fn store_without_path_is_inert() {
        let store = FilterStore::default();
        let merged = store.save(FilterPatch {
            rsci_only: Some(true),
            ..FilterPatch::default()
        });
        assert!(merged.rsci_only);
        assert_eq!(store.load(), FilterPrefs::default());
    }

    #[test]
    fn class_selection_is_set_like() {
        let mut prefs = FilterPrefs::default();
        prefs.apply(FilterPatch {
            selected_classes: Some(vec!["senior".into(), "junior".into(), "senior".into()]),
            ..FilterPatch::default()
        });
        assert_eq!(prefs.selected_classes, vec!["senior".to_string(), "junior".to_string()]);
    }
}

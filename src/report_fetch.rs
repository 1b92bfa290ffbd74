use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::records::{Player, PlayerReport};
use crate::source::{DataSource, Gender, conferences_path, daily_path, rankings_path};

pub const DEFAULT_DAILY_DAYS: u32 = 3;

pub fn fetch_daily_report(
    source: &dyn DataSource,
    date: &str,
    days: u32,
    gender: Gender,
) -> Result<PlayerReport> {
    let body = source.fetch_text(&daily_path(gender, date, days))?;
    parse_player_report_json(&body).context("invalid daily report json")
}

pub fn fetch_season_rankings(
    source: &dyn DataSource,
    date: &str,
    gender: Gender,
) -> Result<PlayerReport> {
    let body = source.fetch_text(&rankings_path(gender, date))?;
    parse_player_report_json(&body).context("invalid rankings json")
}

pub fn fetch_conferences(source: &dyn DataSource, gender: Gender) -> Result<Vec<String>> {
    let body = source.fetch_text(&conferences_path(gender))?;
    parse_conferences_json(&body).context("invalid conferences json")
}

/// Parses `{ meta, players[] }` and normalizes every player.
pub fn parse_player_report_json(raw: &str) -> Result<PlayerReport> {
    let root: Value = serde_json::from_str(raw.trim())?;
    let Value::Object(mut obj) = root else {
        return Err(anyhow!("report is not an object"));
    };
    let meta = obj.remove("meta").filter(|m| !m.is_null());
    let Some(Value::Array(rows)) = obj.remove("players") else {
        return Err(anyhow!("report has no players array"));
    };

    let players = rows
        .into_iter()
        .map(|row| Player::from_row(row).normalize())
        .collect();

    Ok(PlayerReport { meta, players })
}

/// Accepts a bare array or `{ "conferences": [...] }`. Entries may be plain
/// names or objects carrying a `name`/`conference`/`abbreviation` field.
pub fn parse_conferences_json(raw: &str) -> Result<Vec<String>> {
    let root: Value = serde_json::from_str(raw.trim())?;
    let list = match root {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("conferences") {
            Some(Value::Array(items)) => items,
            _ => return Err(anyhow!("conferences payload has no list")),
        },
        _ => return Err(anyhow!("conferences payload has no list")),
    };

    Ok(list.iter().filter_map(conference_name).collect())
}

fn conference_name(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(obj) => ["name", "conference", "abbreviation"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

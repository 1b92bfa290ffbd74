use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::records::{Game, ScheduleSnapshot, ToplineGroups, ToplinePlayer};
use crate::source::{DataSource, Gender, schedule_path, toplines_path};

/// Loads the schedule for `date`, then tries to attach the toplines for the
/// same day. A toplines failure only adds a warning.
pub fn fetch_schedule(source: &dyn DataSource, date: &str, gender: Gender) -> Result<ScheduleSnapshot> {
    let body = source.fetch_text_uncached(&schedule_path(gender, date))?;
    let mut snapshot = parse_schedule_json(&body).context("invalid schedule json")?;

    match fetch_toplines(source, date, gender) {
        Ok(groups) => snapshot.toplines = groups,
        Err(err) => snapshot
            .warnings
            .push(format!("Toplines unavailable for {date}: {err:#}")),
    }

    Ok(snapshot)
}

pub fn fetch_toplines(source: &dyn DataSource, date: &str, gender: Gender) -> Result<ToplineGroups> {
    let body = source.fetch_text(&toplines_path(gender, date))?;
    let rows = parse_toplines_json(&body).context("invalid toplines json")?;
    Ok(group_toplines(rows))
}

/// Parses `{ meta, games[] }`. A missing or malformed games list reads as
/// no games.
pub fn parse_schedule_json(raw: &str) -> Result<ScheduleSnapshot> {
    let root: Value = serde_json::from_str(raw.trim())?;
    let Value::Object(mut obj) = root else {
        return Err(anyhow!("schedule is not an object"));
    };
    let meta = obj.remove("meta").filter(|m| !m.is_null());
    let games = match obj.remove("games") {
        Some(Value::Array(rows)) => rows
            .into_iter()
            .map(|row| serde_json::from_value::<Game>(row).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    };

    Ok(ScheduleSnapshot {
        meta,
        games,
        ..ScheduleSnapshot::default()
    })
}

pub fn parse_toplines_json(raw: &str) -> Result<Vec<ToplinePlayer>> {
    let root: Value = serde_json::from_str(raw.trim())?;
    let rows = match root {
        Value::Object(mut obj) => match obj.remove("players") {
            Some(Value::Array(rows)) => rows,
            _ => return Err(anyhow!("toplines payload has no players array")),
        },
        _ => return Err(anyhow!("toplines payload is not an object")),
    };
    Ok(rows
        .into_iter()
        .filter_map(|row| serde_json::from_value::<ToplinePlayer>(row).ok())
        .collect())
}

/// Buckets toplines by game id, keeping arrival order inside each bucket.
/// Rows without a usable (non-zero) id are dropped.
pub fn group_toplines(rows: Vec<ToplinePlayer>) -> ToplineGroups {
    let mut groups = ToplineGroups::new();
    for row in rows {
        let Some(game_id) = row.game_id.filter(|id| *id != 0) else {
            continue;
        };
        groups.entry(game_id).or_default().push(row);
    }
    groups
}

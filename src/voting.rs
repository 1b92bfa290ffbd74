use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::strip_trailing_slash;
use crate::http_client::http_client;
use crate::source::Gender;

const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One head-to-head prospect vote, in the shape the voting API accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub matchup_id: String,
    pub player_a_id: i64,
    pub player_b_id: i64,
    pub winner_id: i64,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_rating_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_rating_b: Option<f64>,
}

impl Vote {
    pub fn new(player_a_id: i64, player_b_id: i64, winner_id: i64) -> Self {
        let stamp = Utc::now().timestamp_millis();
        Self {
            matchup_id: format!("{player_a_id}-{player_b_id}-{stamp}"),
            player_a_id,
            player_b_id,
            winner_id,
            gender: Gender::Men.as_str().to_string(),
            client_version: Some(CLIENT_VERSION.to_string()),
            seed_rating_a: None,
            seed_rating_b: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoteReceipt {
    pub status: String,
    pub id: String,
}

pub fn validate_vote(vote: &Vote) -> Result<()> {
    if vote.gender != Gender::Men.as_str() {
        return Err(anyhow!("Voting is currently enabled for men only."));
    }
    if vote.matchup_id.trim().is_empty() {
        return Err(anyhow!("vote is missing a matchup id"));
    }
    if vote.player_a_id == vote.player_b_id {
        return Err(anyhow!("a matchup needs two different players"));
    }
    if vote.winner_id != vote.player_a_id && vote.winner_id != vote.player_b_id {
        return Err(anyhow!("winner must be one of the two players"));
    }
    Ok(())
}

pub fn submit_vote(api_base: &str, vote: &Vote) -> Result<VoteReceipt> {
    validate_vote(vote)?;
    let client = http_client()?;
    let url = format!("{}/api/vote", strip_trailing_slash(api_base));
    let resp = client
        .post(&url)
        .json(vote)
        .send()
        .context("vote request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading vote response")?;
    if !status.is_success() {
        return Err(status_error(status.as_u16(), &body));
    }
    serde_json::from_str(&body).context("invalid vote response")
}

pub fn check_health(api_base: &str) -> Result<()> {
    let client = http_client()?;
    let url = format!("{}/api/health", strip_trailing_slash(api_base));
    let resp = client.get(&url).send().context("health request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading health response")?;
    parse_health(status.as_u16(), &body)
}

/// Interprets an `/api/health` response; only `{"status": "ok"}` passes.
pub fn parse_health(status: u16, body: &str) -> Result<()> {
    if !(200..300).contains(&status) {
        return Err(status_error(status, body));
    }
    let body: Value = serde_json::from_str(body).context("invalid health response")?;
    match body.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(()),
        other => Err(anyhow!("voting api unhealthy: {}", other.unwrap_or("unknown"))),
    }
}

/// `HTTP {code}` plus the API's `detail` message when the body carries one.
pub fn status_error(status: u16, body: &str) -> anyhow::Error {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string));
    match detail {
        Some(detail) => anyhow!("HTTP {status}: {detail}"),
        None => anyhow!("HTTP {status}"),
    }
}

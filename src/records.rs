use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

pub const DEFAULT_CLASS: &str = "freshman";
const RECRUIT_RANK_KEY: &str = "recruit_rank";

/// A player row as served by report and schedule snapshots. Unknown keys
/// ride along in `extra` so nothing the generator emits is lost.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Player {
    #[serde(default, deserialize_with = "lenient::opt_i64", skip_serializing_if = "Option::is_none")]
    pub player_id: Option<i64>,
    #[serde(default, alias = "player_name", deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub team_conf: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub experience_display_value: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u32", skip_serializing_if = "Option::is_none")]
    pub recruit_rank: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub headshot: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub headshot_href: Option<String>,

    // Derived by `normalize`.
    #[serde(rename = "classLower", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub class_lower: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u32", skip_serializing_if = "Option::is_none")]
    pub rsci_rank: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    /// Decodes one snapshot row. Rows that are not objects give an empty
    /// player. A `recruit_rank` that is not a rank is kept verbatim in `extra`.
    pub fn from_row(row: Value) -> Self {
        let raw_rank = row.get(RECRUIT_RANK_KEY).filter(|v| !v.is_null()).cloned();
        let mut player: Player = serde_json::from_value(row).unwrap_or_default();
        if player.recruit_rank.is_none()
            && let Some(raw) = raw_rank
        {
            player.extra.insert(RECRUIT_RANK_KEY.to_string(), raw);
        }
        player
    }

    /// Recomputes the display fields from the raw ones.
    pub fn normalize(mut self) -> Self {
        let class = self
            .experience_display_value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CLASS);
        self.class_lower = Some(class.to_lowercase());
        self.rsci_rank = self.recruit_rank;
        self.conference = self.team_conf.clone();
        self
    }

    /// Lowercase class. Rows that were never normalized fall back to their
    /// raw experience value.
    pub fn class_label(&self) -> Cow<'_, str> {
        if let Some(class) = self.class_lower.as_deref() {
            return Cow::Borrowed(class);
        }
        match self.experience_display_value.as_deref().filter(|v| !v.is_empty()) {
            Some(raw) => Cow::Owned(raw.to_lowercase()),
            None => Cow::Borrowed(DEFAULT_CLASS),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }

    /// Fields present on `top` replace the ones on `self`.
    pub fn overlay(mut self, top: &Player) -> Self {
        fn take<T: Clone>(base: &mut Option<T>, top: &Option<T>) {
            if top.is_some() {
                base.clone_from(top);
            }
        }
        take(&mut self.player_id, &top.player_id);
        take(&mut self.name, &top.name);
        take(&mut self.position, &top.position);
        take(&mut self.team, &top.team);
        take(&mut self.team_conf, &top.team_conf);
        take(&mut self.experience_display_value, &top.experience_display_value);
        take(&mut self.recruit_rank, &top.recruit_rank);
        take(&mut self.headshot, &top.headshot);
        take(&mut self.headshot_href, &top.headshot_href);
        take(&mut self.class_lower, &top.class_lower);
        take(&mut self.rsci_rank, &top.rsci_rank);
        take(&mut self.conference, &top.conference);
        for (key, value) in &top.extra {
            self.extra.insert(key.clone(), value.clone());
        }
        self
    }
}

impl From<Value> for Player {
    fn from(row: Value) -> Self {
        Player::from_row(row)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Game {
    #[serde(default, deserialize_with = "lenient::opt_u64", skip_serializing_if = "Option::is_none")]
    pub game_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub featured_players: Vec<Player>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Game {
    /// Looks up a string field the schedule generator emits but this type
    /// does not model (`home_team`, `start_time`, ...).
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToplinePlayer {
    #[serde(default, deserialize_with = "lenient::opt_u64", skip_serializing_if = "Option::is_none")]
    pub game_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_i64", skip_serializing_if = "Option::is_none")]
    pub player_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A featured player after season data and ranks have been folded in.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MergedPlayer {
    #[serde(flatten)]
    pub player: Player,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PlayerReport {
    pub meta: Option<Value>,
    pub players: Vec<Player>,
}

pub type ToplineGroups = BTreeMap<u64, Vec<ToplinePlayer>>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduleSnapshot {
    pub meta: Option<Value>,
    pub games: Vec<Game>,
    pub toplines: ToplineGroups,
    /// Non-fatal problems hit while loading (e.g. toplines missing).
    pub warnings: Vec<String>,
}

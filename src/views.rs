use std::cmp::Ordering;

use crate::featured::{RankLookup, SeasonLookup};
use crate::filters::FilterPrefs;
use crate::records::{Game, Player};

pub fn filter_players<'a>(players: &'a [Player], prefs: &FilterPrefs) -> Vec<&'a Player> {
    let position = prefs.selected_position.trim().to_lowercase();
    let mut out: Vec<&Player> = players
        .iter()
        .filter(|p| {
            prefs.selected_classes.is_empty()
                || prefs
                    .selected_classes
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&p.class_label()))
        })
        .filter(|p| !prefs.rsci_only || p.rsci_rank.is_some_and(|r| r > 0))
        .filter(|p| {
            position.is_empty()
                || p
                    .position
                    .as_deref()
                    .is_some_and(|pos| pos.to_lowercase().contains(&position))
        })
        .filter(|p| {
            prefs.selected_conferences.is_empty()
                || p.conference.as_deref().is_some_and(|conf| {
                    prefs
                        .selected_conferences
                        .iter()
                        .any(|c| c.eq_ignore_ascii_case(conf))
                })
        })
        .collect();

    // Stable sort: ties keep snapshot order, unranked always last.
    out.sort_by(|a, b| match (a.rsci_rank, b.rsci_rank) {
        (Some(x), Some(y)) if prefs.sort_desc => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    out
}

pub fn filter_games<'a>(games: &'a [Game], prefs: &FilterPrefs) -> Vec<&'a Game> {
    games
        .iter()
        .filter(|g| !prefs.featured_only || !g.featured_players.is_empty())
        .filter(|g| {
            prefs.schedule_statuses.is_empty()
                || g.status.as_deref().is_some_and(|status| {
                    prefs
                        .schedule_statuses
                        .iter()
                        .any(|s| s.eq_ignore_ascii_case(status))
                })
        })
        .collect()
}

pub fn season_lookup(players: &[Player]) -> SeasonLookup {
    players
        .iter()
        .filter_map(|p| p.player_id.map(|id| (id, p.clone())))
        .collect()
}

/// 1-based positions within a rankings list. The first occurrence of an id
/// wins.
pub fn rank_lookup(players: &[Player]) -> RankLookup {
    let mut ranks = RankLookup::new();
    for (idx, p) in players.iter().enumerate() {
        let Some(id) = p.player_id else {
            continue;
        };
        let rank = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        ranks.entry(id).or_insert(rank);
    }
    ranks
}

pub fn distinct_classes(players: &[Player]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for p in players {
        let label = p.class_label().to_string();
        if !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

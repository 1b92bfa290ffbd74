use std::collections::HashMap;

use crate::records::{Game, MergedPlayer, Player};

/// Season-long player records keyed by player id.
pub type SeasonLookup = HashMap<i64, Player>;
/// Rank values keyed by player id.
pub type RankLookup = HashMap<i64, u32>;

/// Folds season data and ranks into a game's featured players.
///
/// Output has one entry per featured player, in input order. Missing
/// lookups behave like empty ones. Ids that are absent or zero are kept as
/// they are; filtering them is left to the caller.
pub fn merge_featured_players(
    game: Option<&Game>,
    season: Option<&SeasonLookup>,
    ranks: Option<&RankLookup>,
) -> Vec<MergedPlayer> {
    let Some(game) = game else {
        return Vec::new();
    };

    game.featured_players
        .iter()
        .map(|stub| merge_one(stub, season, ranks))
        .collect()
}

fn merge_one(
    stub: &Player,
    season: Option<&SeasonLookup>,
    ranks: Option<&RankLookup>,
) -> MergedPlayer {
    let pid = stub.player_id;
    let season_row = pid.and_then(|id| season.and_then(|s| s.get(&id)));

    let mut player = match season_row {
        Some(row) => {
            let stub_id = pid.filter(|id| *id != 0);
            let mut merged = stub.clone().overlay(row);
            merged.player_id = stub_id.or(row.player_id);
            merged
        }
        None => stub.clone(),
    };

    if player.headshot.as_deref().is_none_or(str::is_empty)
        && let Some(href) = player.headshot_href.clone().filter(|h| !h.is_empty())
    {
        player.headshot = Some(href);
    }

    // The merged ranks are emitted alongside the flattened row.
    player.extra.remove("display_rank");
    player.extra.remove("class_rank");

    // Rank 0 means "unranked" upstream.
    let rank = pid
        .and_then(|id| ranks.and_then(|r| r.get(&id)))
        .copied()
        .filter(|r| *r != 0);

    MergedPlayer {
        player,
        display_rank: rank,
        class_rank: rank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn game(featured: serde_json::Value) -> Game {
        serde_json::from_value(json!({"game_id": 1, "featured_players": featured})).unwrap()
    }

    #[test]
    fn missing_game_yields_nothing() {
        assert!(merge_featured_players(None, None, None).is_empty());
    }

    #[test]
    fn stub_without_season_row_keeps_its_fields() {
        let g = game(json!([{"player_id": "9", "name": "Solo"}]));
        let out = merge_featured_players(Some(&g), None, None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].player.player_id, Some(9));
        assert_eq!(out[0].player.name.as_deref(), Some("Solo"));
        assert_eq!(out[0].display_rank, None);
    }

    #[test]
    fn zero_rank_is_not_applied() {
        let g = game(json!([{"player_id": 4}]));
        let ranks: RankLookup = [(4, 0)].into_iter().collect();
        let out = merge_featured_players(Some(&g), None, Some(&ranks));
        assert_eq!(out[0].class_rank, None);
    }
}

// Big board ordering from scout rankings.

use std::collections::BTreeSet;

use bigboard_core::dataset::{Dataset, Player, PlayerId, ScoutRanking};

/// Sort key for players without a usable rank. Sorts after every real rank.
pub const UNRANKED: f64 = f64::INFINITY;

/// Maximum number of players in a side-by-side comparison.
pub const MAX_COMPARE: usize = 3;

// ---------------------------------------------------------------------------
// Rank value
// ---------------------------------------------------------------------------

/// Which number a board is ordered by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RankMode {
    /// Mean of every scout's numeric rank.
    #[default]
    Average,
    /// One scout's rank.
    Scout(String),
}

impl RankMode {
    /// `"average"` (any case) or a scout name.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("average") {
            RankMode::Average
        } else {
            RankMode::Scout(value.to_string())
        }
    }
}

/// Ascending sort key for one player: lower is better, `UNRANKED` when the
/// requested number does not exist.
pub fn rank_value(rankings: Option<&ScoutRanking>, mode: &RankMode) -> f64 {
    let Some(rankings) = rankings else {
        return UNRANKED;
    };
    match mode {
        RankMode::Average => {
            let (sum, count) = rankings
                .numeric_ranks()
                .fold((0.0, 0usize), |(s, c), (_, r)| (s + r, c + 1));
            if count == 0 {
                UNRANKED
            } else {
                sum / count as f64
            }
        }
        RankMode::Scout(name) => rankings.rank(name).unwrap_or(UNRANKED),
    }
}

/// `"N/A"` for unranked, whole numbers without decimals, otherwise one decimal.
pub fn format_rank(rank: f64) -> String {
    if !rank.is_finite() {
        "N/A".to_string()
    } else if rank.fract() == 0.0 {
        format!("{rank:.0}")
    } else {
        format!("{rank:.1}")
    }
}

// ---------------------------------------------------------------------------
// Scout opinion
// ---------------------------------------------------------------------------

/// How one scout's rank compares to the player's average rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opinion {
    /// Ranked better (lower) than average.
    Higher,
    /// Ranked worse (higher) than average.
    Lower,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoutOpinion {
    pub scout: String,
    pub rank: Option<f64>,
    pub opinion: Opinion,
}

/// Every scout on the row, flagged against the row's average.
pub fn scout_opinions(rankings: &ScoutRanking) -> Vec<ScoutOpinion> {
    let average = rank_value(Some(rankings), &RankMode::Average);
    rankings
        .ranks
        .keys()
        .map(|scout| {
            let rank = rankings.rank(scout);
            let opinion = match rank {
                Some(r) if average.is_finite() && r < average => Opinion::Higher,
                Some(r) if average.is_finite() && r > average => Opinion::Lower,
                _ => Opinion::Neutral,
            };
            ScoutOpinion {
                scout: scout.clone(),
                rank,
                opinion,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
    /// Case-insensitive substring of the player's name. Empty matches all.
    pub search: String,
    pub team: Option<String>,
    pub league: Option<String>,
}

impl BoardFilter {
    pub fn matches(&self, player: &Player) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !player.name.to_lowercase().contains(&needle) {
            return false;
        }
        if let Some(team) = &self.team {
            if player.current_team.as_deref() != Some(team.as_str()) {
                return false;
            }
        }
        if let Some(league) = &self.league {
            if player.league.as_deref() != Some(league.as_str()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct BoardEntry<'a> {
    pub player: &'a Player,
    pub rankings: Option<&'a ScoutRanking>,
    pub rank: f64,
}

impl BoardEntry<'_> {
    pub fn is_ranked(&self) -> bool {
        self.rank.is_finite()
    }
}

/// Players in board order (ascending rank, unranked last, ties keep dataset
/// order), restricted to those matching `filter`.
pub fn big_board<'a>(dataset: &'a Dataset, filter: &BoardFilter, mode: &RankMode) -> Vec<BoardEntry<'a>> {
    let mut entries: Vec<BoardEntry<'a>> = dataset
        .bio
        .iter()
        .map(|player| {
            let rankings = dataset.ranking(player.player_id);
            BoardEntry {
                player,
                rankings,
                rank: rank_value(rankings, mode),
            }
        })
        .collect();
    entries.sort_by(|a, b| a.rank.total_cmp(&b.rank));
    entries.retain(|e| filter.matches(e.player));
    entries
}

/// Distinct non-empty current teams, sorted.
pub fn teams(dataset: &Dataset) -> Vec<String> {
    distinct(dataset.bio.iter().filter_map(|p| p.current_team.as_deref()))
}

/// Distinct non-empty leagues, sorted.
pub fn leagues(dataset: &Dataset) -> Vec<String> {
    distinct(dataset.bio.iter().filter_map(|p| p.league.as_deref()))
}

/// Every scout that appears in any ranking row, sorted.
pub fn scouts(dataset: &Dataset) -> Vec<String> {
    distinct(
        dataset
            .scout_rankings
            .iter()
            .flat_map(|r| r.ranks.keys().map(String::as_str)),
    )
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Compare selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareToggle {
    Added,
    Removed,
    /// Already at `MAX_COMPARE`; nothing changed.
    Full,
}

/// Ordered selection of up to `MAX_COMPARE` players.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareList {
    ids: Vec<PlayerId>,
}

impl CompareList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: PlayerId) -> CompareToggle {
        if let Some(pos) = self.ids.iter().position(|p| *p == id) {
            self.ids.remove(pos);
            CompareToggle::Removed
        } else if self.ids.len() < MAX_COMPARE {
            self.ids.push(id);
            CompareToggle::Added
        } else {
            CompareToggle::Full
        }
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[PlayerId] {
        &self.ids
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset() -> Dataset {
        serde_json::from_value(json!({
            "bio": [
                {"playerId": 1, "name": "Ace Bailey", "currentTeam": "Rutgers", "league": "NCAA"},
                {"playerId": 2, "name": "Cooper Flagg", "currentTeam": "Duke", "league": "NCAA"},
                {"playerId": 3, "name": "Nolan Traore", "currentTeam": "Saint-Quentin", "league": "LNB Pro A"},
                {"playerId": 4, "name": "Kon Knueppel", "currentTeam": "Duke", "league": "NCAA"}
            ],
            "scoutRankings": [
                {"playerId": 1, "ESPN Rank": 4, "Sam Vecenie Rank": 6},
                {"playerId": 2, "ESPN Rank": 1, "Sam Vecenie Rank": 1},
                {"playerId": 4, "ESPN Rank": null, "Gary Parrish Rank": 9}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn absent_rankings_are_unranked() {
        assert_eq!(rank_value(None, &RankMode::Average), UNRANKED);
    }

    #[test]
    fn average_ignores_non_numeric_entries() {
        let row = ScoutRanking::new(1)
            .with_rank("ESPN", 3)
            .with_rank("Ringer", 5)
            .with_rank("Other", serde_json::Value::Null)
            .with_rank("Note", "top 5");
        assert_eq!(rank_value(Some(&row), &RankMode::Average), 4.0);
    }

    #[test]
    fn average_without_numbers_is_unranked() {
        let row = ScoutRanking::new(1).with_rank("ESPN", serde_json::Value::Null);
        assert_eq!(rank_value(Some(&row), &RankMode::Average), UNRANKED);
    }

    #[test]
    fn single_scout_mode() {
        let row = ScoutRanking::new(1).with_rank("ESPN", 3).with_rank("Ringer", 5);
        assert_eq!(rank_value(Some(&row), &RankMode::Scout("Ringer".into())), 5.0);
        assert_eq!(rank_value(Some(&row), &RankMode::Scout("Nobody".into())), UNRANKED);
    }

    #[test]
    fn rank_mode_parse() {
        assert_eq!(RankMode::parse("Average"), RankMode::Average);
        assert_eq!(RankMode::parse("ESPN Rank"), RankMode::Scout("ESPN Rank".into()));
    }

    #[test]
    fn board_sorts_ascending_with_unranked_last() {
        let ds = dataset();
        let board = big_board(&ds, &BoardFilter::default(), &RankMode::Average);
        let ids: Vec<PlayerId> = board.iter().map(|e| e.player.player_id).collect();
        assert_eq!(ids, vec![2, 1, 4, 3]);
        assert!(!board[3].is_ranked());
        assert_eq!(board[1].rank, 5.0);
    }

    #[test]
    fn board_by_scout_puts_missing_ranks_last_in_dataset_order() {
        let ds = dataset();
        let board = big_board(&ds, &BoardFilter::default(), &RankMode::Scout("ESPN Rank".into()));
        let ids: Vec<PlayerId> = board.iter().map(|e| e.player.player_id).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
    }

    #[test]
    fn filter_by_search_team_and_league() {
        let ds = dataset();
        let by_name = BoardFilter {
            search: "  FLAGG ".into(),
            ..Default::default()
        };
        assert_eq!(big_board(&ds, &by_name, &RankMode::Average).len(), 1);

        let by_team = BoardFilter {
            team: Some("Duke".into()),
            ..Default::default()
        };
        let ids: Vec<PlayerId> = big_board(&ds, &by_team, &RankMode::Average)
            .iter()
            .map(|e| e.player.player_id)
            .collect();
        assert_eq!(ids, vec![2, 4]);

        let by_league = BoardFilter {
            league: Some("LNB Pro A".into()),
            ..Default::default()
        };
        assert_eq!(big_board(&ds, &by_league, &RankMode::Average)[0].player.player_id, 3);
    }

    #[test]
    fn distinct_teams_leagues_and_scouts() {
        let ds = dataset();
        assert_eq!(teams(&ds), vec!["Duke", "Rutgers", "Saint-Quentin"]);
        assert_eq!(leagues(&ds), vec!["LNB Pro A", "NCAA"]);
        assert_eq!(
            scouts(&ds),
            vec!["ESPN Rank", "Gary Parrish Rank", "Sam Vecenie Rank"]
        );
    }

    #[test]
    fn opinions_relative_to_average() {
        let row = ScoutRanking::new(1)
            .with_rank("A", 2)
            .with_rank("B", 6)
            .with_rank("C", 4)
            .with_rank("D", serde_json::Value::Null);
        let opinions = scout_opinions(&row);
        let by_scout = |s: &str| opinions.iter().find(|o| o.scout == s).unwrap().opinion;
        assert_eq!(by_scout("A"), Opinion::Higher);
        assert_eq!(by_scout("B"), Opinion::Lower);
        assert_eq!(by_scout("C"), Opinion::Neutral);
        assert_eq!(by_scout("D"), Opinion::Neutral);
    }

    #[test]
    fn format_rank_variants() {
        assert_eq!(format_rank(UNRANKED), "N/A");
        assert_eq!(format_rank(3.0), "3");
        assert_eq!(format_rank(4.5), "4.5");
    }

    #[test]
    fn compare_list_caps_at_three() {
        let mut list = CompareList::new();
        assert_eq!(list.toggle(1), CompareToggle::Added);
        assert_eq!(list.toggle(2), CompareToggle::Added);
        assert_eq!(list.toggle(3), CompareToggle::Added);
        assert_eq!(list.toggle(4), CompareToggle::Full);
        assert_eq!(list.ids(), &[1, 2, 3]);

        assert_eq!(list.toggle(2), CompareToggle::Removed);
        assert_eq!(list.toggle(4), CompareToggle::Added);
        assert_eq!(list.ids(), &[1, 3, 4]);
        assert!(list.contains(4));
    }
}

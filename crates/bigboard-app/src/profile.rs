// Player profile, game log and side-by-side comparison views.
//
// Each view gathers what one screen needs from the dataset. Missing records
// show up as `None` / empty collections rather than errors.

use chrono::NaiveDate;

use bigboard_core::dataset::{Dataset, GameLog, GameStat, MeasurementField, Player, PlayerId};
use bigboard_nba::measurements::{self, FieldComparison, MeasurementChartRow};
use bigboard_nba::ranking::{self, CompareList, RankMode, ScoutOpinion};
use bigboard_nba::stats::{self, CareerLine, ComparisonChartRow, DevelopmentPoint, GameSort, StatMode};

/// Shown in place of a stat that cannot be computed.
pub const PLACEHOLDER: &str = "\u{2014}";

/// One decimal, or the placeholder.
pub fn display_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Inches as feet and inches, e.g. `6'9"`.
pub fn display_height(inches: Option<f64>) -> String {
    match inches {
        Some(total) if total.is_finite() && total > 0.0 => {
            let total = total.round() as i64;
            format!("{}'{}\"", total / 12, total % 12)
        }
        _ => "N/A".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlayerProfile<'a> {
    pub player: &'a Player,
    pub age: Option<i32>,
    pub rank: f64,
    pub opinions: Vec<ScoutOpinion>,
    /// Empty when the player has no measurement record.
    pub measurements: Vec<FieldComparison>,
    pub career: CareerLine,
    /// Newest first.
    pub seasons: Vec<i32>,
    pub development: Vec<DevelopmentPoint>,
}

impl PlayerProfile<'_> {
    pub fn has_measurements(&self) -> bool {
        !self.measurements.is_empty()
    }
}

pub fn player_profile<'a>(
    dataset: &'a Dataset,
    id: PlayerId,
    mode: &RankMode,
    stat_mode: StatMode,
    today: NaiveDate,
) -> Option<PlayerProfile<'a>> {
    let player = dataset.player(id)?;
    let rankings = dataset.ranking(id);
    let season_logs = dataset.season_logs_for(id);
    let birth = player.birth_date();

    let measurements = dataset
        .measurement(id)
        .map(|m| measurements::compare(m, &dataset.measurements, &MeasurementField::ALL))
        .unwrap_or_default();

    Some(PlayerProfile {
        player,
        age: birth.map(|b| stats::age_on(b, today)),
        rank: ranking::rank_value(rankings, mode),
        opinions: rankings.map(ranking::scout_opinions).unwrap_or_default(),
        measurements,
        career: stats::career_line(&season_logs, stat_mode),
        seasons: stats::seasons(&season_logs),
        development: stats::season_development(&season_logs, birth),
    })
}

// ---------------------------------------------------------------------------
// Game logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GameLogView<'a> {
    /// Every season with game or season logs, newest first.
    pub seasons: Vec<i32>,
    pub selected: Option<i32>,
    pub games: Vec<&'a GameLog>,
    pub highs: Vec<(GameStat, Option<f64>)>,
}

impl GameLogView<'_> {
    /// Whether `game` holds the season high for `stat`.
    pub fn is_high(&self, game: &GameLog, stat: GameStat) -> bool {
        let high = self
            .highs
            .iter()
            .find(|(s, _)| *s == stat)
            .and_then(|(_, h)| *h);
        matches!((high, game.stat(stat)), (Some(h), Some(v)) if h == v)
    }
}

/// Game logs for `season` (default: newest available), optionally sorted.
/// Season highs are computed over the selected season's games.
pub fn game_log_view(dataset: &Dataset, id: PlayerId, season: Option<i32>, sort: Option<GameSort>) -> GameLogView<'_> {
    let all_games = dataset.game_logs_for(id);
    let seasons = stats::available_seasons(&dataset.season_logs_for(id), &all_games);
    let selected = season.or_else(|| seasons.first().copied());

    let mut games = match selected {
        Some(s) => stats::games_in_season(&all_games, s),
        None => Vec::new(),
    };
    let highs = stats::season_highs(&games);
    if let Some(sort) = sort {
        stats::sort_game_logs(&mut games, sort);
    }

    GameLogView {
        seasons,
        selected,
        games,
        highs,
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ComparisonView<'a> {
    /// Selected players found in the dataset, in selection order.
    pub players: Vec<&'a Player>,
    pub stats: Vec<ComparisonChartRow>,
    pub measurements: Vec<MeasurementChartRow>,
}

pub fn comparison_view<'a>(dataset: &'a Dataset, selection: &CompareList) -> ComparisonView<'a> {
    let ids: Vec<PlayerId> = selection
        .ids()
        .iter()
        .copied()
        .filter(|id| dataset.player(*id).is_some())
        .collect();
    ComparisonView {
        players: ids.iter().filter_map(|id| dataset.player(*id)).collect(),
        stats: stats::comparison_chart(dataset, &ids),
        measurements: measurements::measurement_chart(dataset, &ids, &MeasurementField::ALL),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

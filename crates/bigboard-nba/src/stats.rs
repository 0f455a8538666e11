// Career and season statistics weighted by games played, plus game log
// helpers (season highs, sorting, minutes parsing).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use bigboard_core::dataset::{Dataset, GameLog, GameStat, PlayerId, SeasonLog, SeasonStat};

/// Stats charted across players on the comparison view.
pub const COMPARISON_STATS: [SeasonStat; 9] = [
    SeasonStat::Points,
    SeasonStat::Rebounds,
    SeasonStat::Assists,
    SeasonStat::Steals,
    SeasonStat::Blocks,
    SeasonStat::Turnovers,
    SeasonStat::FieldGoalPct,
    SeasonStat::ThreePointPct,
    SeasonStat::FreeThrowPct,
];

/// Stats tracked season over season on the development chart.
pub const DEVELOPMENT_STATS: [SeasonStat; 6] = [
    SeasonStat::Minutes,
    SeasonStat::Points,
    SeasonStat::Assists,
    SeasonStat::Rebounds,
    SeasonStat::Steals,
    SeasonStat::Blocks,
];

/// Game log columns that get a season-high marker.
pub const HIGH_STATS: [GameStat; 6] = [
    GameStat::Points,
    GameStat::Rebounds,
    GameStat::Assists,
    GameStat::Steals,
    GameStat::Blocks,
    GameStat::Turnovers,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatMode {
    #[default]
    PerGame,
    Total,
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Weighted aggregation
// ---------------------------------------------------------------------------

pub fn total_games(records: &[&SeasonLog]) -> u32 {
    records.iter().map(|r| r.games_played).sum()
}

/// `Σ(value × GP)`. Missing values count as 0.
pub fn weighted_total(records: &[&SeasonLog], stat: SeasonStat) -> f64 {
    records
        .iter()
        .map(|r| r.stat(stat).unwrap_or(0.0) * f64::from(r.games_played))
        .sum()
}

/// `Σ(value × GP) / Σ(GP)`, or `None` when no games were played.
///
/// A record with a missing value still adds its games to the denominator.
pub fn weighted_average(records: &[&SeasonLog], stat: SeasonStat) -> Option<f64> {
    let games = total_games(records);
    if games == 0 {
        return None;
    }
    Some(weighted_total(records, stat) / f64::from(games))
}

/// Career figure for one stat in `mode`. Percentages are always averaged.
pub fn career_value(records: &[&SeasonLog], stat: SeasonStat, mode: StatMode) -> Option<f64> {
    if mode == StatMode::PerGame || stat.is_percentage() {
        weighted_average(records, stat)
    } else {
        Some(weighted_total(records, stat).round())
    }
}

// ---------------------------------------------------------------------------
// Career and season tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CareerLine {
    pub games_played: u32,
    pub values: Vec<(SeasonStat, Option<f64>)>,
}

impl CareerLine {
    pub fn get(&self, stat: SeasonStat) -> Option<f64> {
        self.values
            .iter()
            .find(|(s, _)| *s == stat)
            .and_then(|(_, v)| *v)
    }
}

/// Career row across every season log, display-rounded to one decimal.
pub fn career_line(records: &[&SeasonLog], mode: StatMode) -> CareerLine {
    CareerLine {
        games_played: total_games(records),
        values: SeasonStat::ALL
            .into_iter()
            .map(|stat| (stat, career_value(records, stat, mode).map(round1)))
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRow {
    pub season: i32,
    pub team: Option<String>,
    pub league: Option<String>,
    pub games_played: u32,
    pub values: Vec<(SeasonStat, Option<f64>)>,
}

impl SeasonRow {
    pub fn get(&self, stat: SeasonStat) -> Option<f64> {
        self.values
            .iter()
            .find(|(s, _)| *s == stat)
            .and_then(|(_, v)| *v)
    }
}

/// One row per team record in `season`. Total mode multiplies counting stats
/// by games played and rounds to whole numbers.
pub fn season_rows(records: &[&SeasonLog], season: i32, mode: StatMode) -> Vec<SeasonRow> {
    records
        .iter()
        .filter(|r| r.season == season)
        .map(|r| SeasonRow {
            season: r.season,
            team: r.team.clone(),
            league: r.league.clone(),
            games_played: r.games_played,
            values: SeasonStat::ALL
                .into_iter()
                .map(|stat| {
                    let value = r.stat(stat);
                    let shown = match mode {
                        StatMode::Total if !stat.is_percentage() => {
                            value.map(|v| (v * f64::from(r.games_played)).round())
                        }
                        _ => value,
                    };
                    (stat, shown)
                })
                .collect(),
        })
        .collect()
}

/// Distinct seasons in the season logs, newest first.
pub fn seasons(records: &[&SeasonLog]) -> Vec<i32> {
    records
        .iter()
        .map(|r| r.season)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}

// ---------------------------------------------------------------------------
// Development chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DevelopmentPoint {
    pub season: i32,
    pub age: Option<i32>,
    /// Every team played for that season, joined with `", "`.
    pub teams: String,
    pub values: Vec<(SeasonStat, f64)>,
}

/// Season-by-season averages, oldest first. Multiple team records in one
/// season are averaged by record count.
pub fn season_development(records: &[&SeasonLog], birth_date: Option<NaiveDate>) -> Vec<DevelopmentPoint> {
    let mut by_season: BTreeMap<i32, Vec<&SeasonLog>> = BTreeMap::new();
    for r in records {
        by_season.entry(r.season).or_default().push(r);
    }

    by_season
        .into_iter()
        .map(|(season, rows)| {
            let count = rows.len() as f64;
            let teams = rows
                .iter()
                .filter_map(|r| r.team.as_deref())
                .collect::<Vec<_>>()
                .join(", ");
            let values = DEVELOPMENT_STATS
                .into_iter()
                .map(|stat| {
                    let sum: f64 = rows.iter().map(|r| r.stat(stat).unwrap_or(0.0)).sum();
                    (stat, round1(sum / count))
                })
                .collect();
            DevelopmentPoint {
                season,
                age: birth_date.map(|b| season - b.year()),
                teams,
                values,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Multi-player comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonChartRow {
    pub stat: SeasonStat,
    /// Career per-game value per requested player. No games played → 0.
    pub values: Vec<(PlayerId, f64)>,
}

pub fn comparison_chart(dataset: &Dataset, players: &[PlayerId]) -> Vec<ComparisonChartRow> {
    let logs: Vec<(PlayerId, Vec<&SeasonLog>)> = players
        .iter()
        .map(|&id| (id, dataset.season_logs_for(id)))
        .collect();

    COMPARISON_STATS
        .into_iter()
        .map(|stat| ComparisonChartRow {
            stat,
            values: logs
                .iter()
                .map(|(id, records)| {
                    let value = weighted_average(records, stat).map(round1).unwrap_or(0.0);
                    (*id, value)
                })
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Game logs
// ---------------------------------------------------------------------------

/// `"MM:SS"` → fractional minutes.
pub fn parse_time_played(value: &str) -> Option<f64> {
    let (min, sec) = value.trim().split_once(':')?;
    let min: f64 = min.trim().parse().ok()?;
    let sec: f64 = sec.trim().parse().ok()?;
    Some(min + sec / 60.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSort {
    Stat(GameStat),
    TimePlayed,
}

fn game_sort_key(log: &GameLog, sort: GameSort) -> f64 {
    let value = match sort {
        GameSort::Stat(stat) => log.stat(stat),
        GameSort::TimePlayed => log.time_played.as_deref().and_then(parse_time_played),
    };
    value.unwrap_or(f64::NEG_INFINITY)
}

/// Descending by `sort`; games missing the value go last, in input order.
pub fn sort_game_logs(logs: &mut [&GameLog], sort: GameSort) {
    logs.sort_by(|a, b| game_sort_key(b, sort).total_cmp(&game_sort_key(a, sort)));
}

pub fn games_in_season<'a>(logs: &[&'a GameLog], season: i32) -> Vec<&'a GameLog> {
    logs.iter().copied().filter(|g| g.season == season).collect()
}

/// Highest value of each `HIGH_STATS` column across `logs`. `None` when no
/// game has the stat.
pub fn season_highs(logs: &[&GameLog]) -> Vec<(GameStat, Option<f64>)> {
    HIGH_STATS
        .into_iter()
        .map(|stat| {
            let high = logs
                .iter()
                .filter_map(|g| g.stat(stat))
                .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))));
            (stat, high)
        })
        .collect()
}

/// Union of seasons in game and season logs, newest first.
pub fn available_seasons(season_logs: &[&SeasonLog], game_logs: &[&GameLog]) -> Vec<i32> {
    season_logs
        .iter()
        .map(|s| s.season)
        .chain(game_logs.iter().map(|g| g.season))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

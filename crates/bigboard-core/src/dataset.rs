// Read-only prospect dataset: bios, scout rankings, combine measurements,
// season logs, and game logs, loaded from a single bundled JSON document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Numeric identifier shared by every record about one prospect.
pub type PlayerId = u64;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Player bio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub player_id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// ISO-style date, possibly with a time suffix (`2006-01-16T00:00:00`).
    #[serde(default)]
    pub birth_date: Option<String>,
    /// Inches.
    #[serde(default)]
    pub height: Option<f64>,
    /// Pounds.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub high_school: Option<String>,
    #[serde(default)]
    pub home_town: Option<String>,
    #[serde(default)]
    pub home_state: Option<String>,
    #[serde(default)]
    pub home_country: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub current_team: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub league_type: Option<String>,
}

impl Player {
    /// Birth date parsed from the first ten characters (`YYYY-MM-DD`).
    pub fn birth_date(&self) -> Option<NaiveDate> {
        let raw = self.birth_date.as_deref()?;
        let day = raw.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn birth_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.birth_date().map(|d| d.year())
    }
}

// ---------------------------------------------------------------------------
// Scout rankings
// ---------------------------------------------------------------------------

/// One row of scout rankings. Every key other than `playerId` names a scout;
/// values are ranks where present and may be `null` or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutRanking {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub ranks: BTreeMap<String, serde_json::Value>,
}

impl ScoutRanking {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            ranks: BTreeMap::new(),
        }
    }

    /// Builder-style setter used when assembling rankings by hand.
    pub fn with_rank(mut self, scout: &str, rank: impl Into<serde_json::Value>) -> Self {
        self.ranks.insert(scout.to_string(), rank.into());
        self
    }

    /// Numeric rank from `scout`, if one is present.
    pub fn rank(&self, scout: &str) -> Option<f64> {
        self.ranks.get(scout).and_then(serde_json::Value::as_f64)
    }

    /// Every numeric scout rank on this row.
    pub fn numeric_ranks(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ranks
            .iter()
            .filter_map(|(scout, v)| v.as_f64().map(|r| (scout.as_str(), r)))
    }
}

// ---------------------------------------------------------------------------
// Combine measurements
// ---------------------------------------------------------------------------

/// The comparable measurement columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeasurementField {
    HeightNoShoes,
    HeightShoes,
    Wingspan,
    Reach,
    Weight,
    MaxVertical,
    NoStepVertical,
    HandLength,
    HandWidth,
    Agility,
    Sprint,
    ShuttleBest,
    BodyFat,
}

impl MeasurementField {
    /// Display order.
    pub const ALL: [MeasurementField; 13] = [
        MeasurementField::HeightNoShoes,
        MeasurementField::HeightShoes,
        MeasurementField::Wingspan,
        MeasurementField::Reach,
        MeasurementField::Weight,
        MeasurementField::MaxVertical,
        MeasurementField::NoStepVertical,
        MeasurementField::HandLength,
        MeasurementField::HandWidth,
        MeasurementField::Agility,
        MeasurementField::Sprint,
        MeasurementField::ShuttleBest,
        MeasurementField::BodyFat,
    ];

    /// JSON key in the dataset.
    pub fn key(self) -> &'static str {
        match self {
            MeasurementField::HeightNoShoes => "heightNoShoes",
            MeasurementField::HeightShoes => "heightShoes",
            MeasurementField::Wingspan => "wingspan",
            MeasurementField::Reach => "reach",
            MeasurementField::Weight => "weight",
            MeasurementField::MaxVertical => "maxVertical",
            MeasurementField::NoStepVertical => "noStepVertical",
            MeasurementField::HandLength => "handLength",
            MeasurementField::HandWidth => "handWidth",
            MeasurementField::Agility => "agility",
            MeasurementField::Sprint => "sprint",
            MeasurementField::ShuttleBest => "shuttleBest",
            MeasurementField::BodyFat => "bodyFat",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeasurementField::HeightNoShoes => "Height (No Shoes)",
            MeasurementField::HeightShoes => "Height (With Shoes)",
            MeasurementField::Wingspan => "Wingspan",
            MeasurementField::Reach => "Standing Reach",
            MeasurementField::Weight => "Weight",
            MeasurementField::MaxVertical => "Max Vertical",
            MeasurementField::NoStepVertical => "No-Step Vertical",
            MeasurementField::HandLength => "Hand Length",
            MeasurementField::HandWidth => "Hand Width",
            MeasurementField::Agility => "Lane Agility",
            MeasurementField::Sprint => "Sprint",
            MeasurementField::ShuttleBest => "Shuttle (Best)",
            MeasurementField::BodyFat => "Body Fat %",
        }
    }

    /// Suffix appended to a formatted value.
    pub fn unit(self) -> &'static str {
        match self {
            MeasurementField::HeightNoShoes
            | MeasurementField::HeightShoes
            | MeasurementField::Wingspan
            | MeasurementField::Reach
            | MeasurementField::MaxVertical
            | MeasurementField::NoStepVertical
            | MeasurementField::HandLength
            | MeasurementField::HandWidth => "\"",
            MeasurementField::Weight => " lbs",
            MeasurementField::Agility | MeasurementField::Sprint | MeasurementField::ShuttleBest => {
                " sec"
            }
            MeasurementField::BodyFat => "%",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub player_id: PlayerId,
    #[serde(default)]
    pub height_no_shoes: Option<f64>,
    #[serde(default)]
    pub height_shoes: Option<f64>,
    #[serde(default)]
    pub wingspan: Option<f64>,
    #[serde(default)]
    pub reach: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub max_vertical: Option<f64>,
    #[serde(default)]
    pub no_step_vertical: Option<f64>,
    #[serde(default)]
    pub hand_length: Option<f64>,
    #[serde(default)]
    pub hand_width: Option<f64>,
    #[serde(default)]
    pub agility: Option<f64>,
    #[serde(default)]
    pub sprint: Option<f64>,
    #[serde(default)]
    pub shuttle_left: Option<f64>,
    #[serde(default)]
    pub shuttle_right: Option<f64>,
    #[serde(default)]
    pub shuttle_best: Option<f64>,
    #[serde(default)]
    pub body_fat: Option<f64>,
}

impl Measurement {
    pub fn value(&self, field: MeasurementField) -> Option<f64> {
        match field {
            MeasurementField::HeightNoShoes => self.height_no_shoes,
            MeasurementField::HeightShoes => self.height_shoes,
            MeasurementField::Wingspan => self.wingspan,
            MeasurementField::Reach => self.reach,
            MeasurementField::Weight => self.weight,
            MeasurementField::MaxVertical => self.max_vertical,
            MeasurementField::NoStepVertical => self.no_step_vertical,
            MeasurementField::HandLength => self.hand_length,
            MeasurementField::HandWidth => self.hand_width,
            MeasurementField::Agility => self.agility,
            MeasurementField::Sprint => self.sprint,
            MeasurementField::ShuttleBest => self.shuttle_best,
            MeasurementField::BodyFat => self.body_fat,
        }
    }
}

// ---------------------------------------------------------------------------
// Season logs
// ---------------------------------------------------------------------------

/// Per-game stat columns of a season log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeasonStat {
    Minutes,
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    Fouls,
    FieldGoalPct,
    ThreePointPct,
    FreeThrowPct,
}

impl SeasonStat {
    pub const ALL: [SeasonStat; 11] = [
        SeasonStat::Minutes,
        SeasonStat::Points,
        SeasonStat::Rebounds,
        SeasonStat::Assists,
        SeasonStat::Steals,
        SeasonStat::Blocks,
        SeasonStat::Turnovers,
        SeasonStat::Fouls,
        SeasonStat::FieldGoalPct,
        SeasonStat::ThreePointPct,
        SeasonStat::FreeThrowPct,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SeasonStat::Minutes => "MP",
            SeasonStat::Points => "PTS",
            SeasonStat::Rebounds => "TRB",
            SeasonStat::Assists => "AST",
            SeasonStat::Steals => "STL",
            SeasonStat::Blocks => "BLK",
            SeasonStat::Turnovers => "TOV",
            SeasonStat::Fouls => "PF",
            SeasonStat::FieldGoalPct => "FG%",
            SeasonStat::ThreePointPct => "3P%",
            SeasonStat::FreeThrowPct => "FTP",
        }
    }

    /// Shooting percentages are always averaged, never totalled.
    pub fn is_percentage(self) -> bool {
        matches!(
            self,
            SeasonStat::FieldGoalPct | SeasonStat::ThreePointPct | SeasonStat::FreeThrowPct
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonLog {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(rename = "Season", deserialize_with = "whole_number")]
    pub season: i32,
    #[serde(rename = "League", default)]
    pub league: Option<String>,
    #[serde(rename = "Team", default)]
    pub team: Option<String>,
    /// Absent, null or negative counts as no games.
    #[serde(rename = "GP", default, deserialize_with = "games_played")]
    pub games_played: u32,
    #[serde(rename = "MP", default)]
    pub minutes: Option<f64>,
    #[serde(rename = "PTS", default)]
    pub points: Option<f64>,
    #[serde(rename = "TRB", default)]
    pub rebounds: Option<f64>,
    #[serde(rename = "AST", default)]
    pub assists: Option<f64>,
    #[serde(rename = "STL", default)]
    pub steals: Option<f64>,
    #[serde(rename = "BLK", default)]
    pub blocks: Option<f64>,
    #[serde(rename = "TOV", default)]
    pub turnovers: Option<f64>,
    #[serde(rename = "PF", default)]
    pub fouls: Option<f64>,
    #[serde(rename = "FG%", default)]
    pub fg_pct: Option<f64>,
    #[serde(rename = "3P%", default)]
    pub three_pct: Option<f64>,
    #[serde(rename = "FTP", default)]
    pub ft_pct: Option<f64>,
}

impl SeasonLog {
    pub fn stat(&self, stat: SeasonStat) -> Option<f64> {
        match stat {
            SeasonStat::Minutes => self.minutes,
            SeasonStat::Points => self.points,
            SeasonStat::Rebounds => self.rebounds,
            SeasonStat::Assists => self.assists,
            SeasonStat::Steals => self.steals,
            SeasonStat::Blocks => self.blocks,
            SeasonStat::Turnovers => self.turnovers,
            SeasonStat::Fouls => self.fouls,
            SeasonStat::FieldGoalPct => self.fg_pct,
            SeasonStat::ThreePointPct => self.three_pct,
            SeasonStat::FreeThrowPct => self.ft_pct,
        }
    }
}

// ---------------------------------------------------------------------------
// Game logs
// ---------------------------------------------------------------------------

/// Box-score columns of a game log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameStat {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    Fouls,
    FieldGoalsMade,
    FieldGoalsAttempted,
    ThreesMade,
    ThreesAttempted,
    FreeThrowsMade,
    FreeThrowsAttempted,
    PlusMinus,
}

impl GameStat {
    pub fn key(self) -> &'static str {
        match self {
            GameStat::Points => "pts",
            GameStat::Rebounds => "reb",
            GameStat::Assists => "ast",
            GameStat::Steals => "stl",
            GameStat::Blocks => "blk",
            GameStat::Turnovers => "tov",
            GameStat::Fouls => "pf",
            GameStat::FieldGoalsMade => "fgm",
            GameStat::FieldGoalsAttempted => "fga",
            GameStat::ThreesMade => "tpm",
            GameStat::ThreesAttempted => "tpa",
            GameStat::FreeThrowsMade => "ftm",
            GameStat::FreeThrowsAttempted => "fta",
            GameStat::PlusMinus => "plusMinus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLog {
    pub player_id: PlayerId,
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub game_id: Option<u64>,
    #[serde(deserialize_with = "whole_number")]
    pub season: i32,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub opponent: Option<String>,
    /// `"MM:SS"`.
    #[serde(default)]
    pub time_played: Option<String>,
    #[serde(default)]
    pub pts: Option<f64>,
    #[serde(default)]
    pub reb: Option<f64>,
    #[serde(default)]
    pub ast: Option<f64>,
    #[serde(default)]
    pub stl: Option<f64>,
    #[serde(default)]
    pub blk: Option<f64>,
    #[serde(default)]
    pub tov: Option<f64>,
    #[serde(default)]
    pub pf: Option<f64>,
    #[serde(default)]
    pub fgm: Option<f64>,
    #[serde(default)]
    pub fga: Option<f64>,
    #[serde(default)]
    pub tpm: Option<f64>,
    #[serde(default)]
    pub tpa: Option<f64>,
    #[serde(default)]
    pub ftm: Option<f64>,
    #[serde(default)]
    pub fta: Option<f64>,
    #[serde(default)]
    pub plus_minus: Option<f64>,
}

impl GameLog {
    pub fn stat(&self, stat: GameStat) -> Option<f64> {
        match stat {
            GameStat::Points => self.pts,
            GameStat::Rebounds => self.reb,
            GameStat::Assists => self.ast,
            GameStat::Steals => self.stl,
            GameStat::Blocks => self.blk,
            GameStat::Turnovers => self.tov,
            GameStat::Fouls => self.pf,
            GameStat::FieldGoalsMade => self.fgm,
            GameStat::FieldGoalsAttempted => self.fga,
            GameStat::ThreesMade => self.tpm,
            GameStat::ThreesAttempted => self.tpa,
            GameStat::FreeThrowsMade => self.ftm,
            GameStat::FreeThrowsAttempted => self.fta,
            GameStat::PlusMinus => self.plus_minus,
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field parsing
// ---------------------------------------------------------------------------

// Exports write whole numbers as either `31` or `31.0`.

fn whole_number<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let v = f64::deserialize(d)?;
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!("expected a whole number, got {v}")));
    }
    Ok(v as i32)
}

fn optional_whole_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let v = Option::<f64>::deserialize(d)?;
    Ok(v.filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0).map(|n| n as u64))
}

fn games_played<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = Option::<f64>::deserialize(d)?;
    Ok(v.filter(|n| n.is_finite() && *n > 0.0).map_or(0, |n| n.round() as u32))
}

/// A collection where each malformed record is skipped with a warning
/// instead of failing the whole document. `null` reads as empty.
fn records<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(d)?.unwrap_or_default();
    let total = raw.len();
    let parsed: Vec<T> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed dataset record #{i}: {e}");
                None
            }
        })
        .collect();
    if parsed.len() < total {
        warn!("Skipped {} of {total} dataset records", total - parsed.len());
    }
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, deserialize_with = "records")]
    pub bio: Vec<Player>,
    #[serde(default, rename = "scoutRankings", deserialize_with = "records")]
    pub scout_rankings: Vec<ScoutRanking>,
    #[serde(default, deserialize_with = "records")]
    pub measurements: Vec<Measurement>,
    #[serde(default, rename = "seasonLogs", deserialize_with = "records")]
    pub season_logs: Vec<SeasonLog>,
    #[serde(default, rename = "game_logs", deserialize_with = "records")]
    pub game_logs: Vec<GameLog>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let dataset: Dataset = serde_json::from_str(&text).map_err(|e| DatasetError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!(
            "Loaded dataset {}: {} players, {} rankings, {} measurements, {} season logs, {} game logs",
            path.display(),
            dataset.bio.len(),
            dataset.scout_rankings.len(),
            dataset.measurements.len(),
            dataset.season_logs.len(),
            dataset.game_logs.len(),
        );
        Ok(dataset)
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.bio.iter().find(|p| p.player_id == id)
    }

    pub fn ranking(&self, id: PlayerId) -> Option<&ScoutRanking> {
        self.scout_rankings.iter().find(|r| r.player_id == id)
    }

    pub fn measurement(&self, id: PlayerId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.player_id == id)
    }

    pub fn season_logs_for(&self, id: PlayerId) -> Vec<&SeasonLog> {
        self.season_logs.iter().filter(|s| s.player_id == id).collect()
    }

    pub fn game_logs_for(&self, id: PlayerId) -> Vec<&GameLog> {
        self.game_logs.iter().filter(|g| g.player_id == id).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

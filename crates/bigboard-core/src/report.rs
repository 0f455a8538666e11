// Scouting report model and the enumerated choices a report is built from.

use std::fmt;

use chrono::{DateTime, Local};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dataset::PlayerId;

/// The twelve rated traits, in display order.
pub const TRAITS: [&str; 12] = [
    "Shooting",
    "Ball Handling",
    "Playmaking",
    "Finishing",
    "Rebounding",
    "Perimeter Defense",
    "Post Defense",
    "Help Defense",
    "Athleticism",
    "IQ",
    "Toughness",
    "Motor",
];

pub const DEFAULT_RATING: i32 = 5;
pub const MIN_RATING: i32 = 0;
pub const MAX_RATING: i32 = 10;

// ---------------------------------------------------------------------------
// Enumerated choices
// ---------------------------------------------------------------------------

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// Every choice, lowest tier first.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_label(label: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.label() == label)
            }

            /// Position in `ALL`.
            pub fn tier(self) -> usize {
                Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum! {
    /// When in the scouting cycle a report was written.
    ReportTag {
        PreDraft => "Pre-Draft",
        MidSeason => "Mid-Season",
        EndOfSeason => "End of Season",
    }
}

labelled_enum! {
    ProjectedRole {
        Developmental => "Developmental",
        Bench => "Bench",
        RolePlayer => "Role Player",
        Starter => "Starter",
    }
}

labelled_enum! {
    Ceiling {
        FringeRoster => "Fringe Roster",
        RotationPlayer => "Rotation Player",
        Starter => "Starter",
        HighLevelStarter => "High-Level Starter",
        AllStar => "All-Star",
        AllNba => "All-NBA",
        HallOfFamer => "Hall of Famer",
    }
}

labelled_enum! {
    /// Projected draft slot, best first.
    DraftRange {
        Lottery => "Lottery",
        Mid1st => "Mid 1st",
        Late1st => "Late 1st",
        SecondRound => "2nd Round",
        Undrafted => "Undrafted",
    }
}

// ---------------------------------------------------------------------------
// Trait ratings
// ---------------------------------------------------------------------------

/// Trait name → rating, kept in insertion order. Serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitRatings(Vec<(String, i32)>);

impl TraitRatings {
    /// Every trait in `TRAITS` at `DEFAULT_RATING`.
    pub fn defaults() -> Self {
        Self(
            TRAITS
                .iter()
                .map(|t| (t.to_string(), DEFAULT_RATING))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Replace an existing rating or append a new one.
    pub fn set(&mut self, name: &str, value: i32) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.0.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i32)> for TraitRatings {
    fn from_iter<I: IntoIterator<Item = (S, i32)>>(iter: I) -> Self {
        let mut ratings = TraitRatings::default();
        for (name, value) in iter {
            ratings.set(&name.into(), value);
        }
        ratings
    }
}

impl Serialize for TraitRatings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TraitRatings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RatingsVisitor;

        impl<'de> Visitor<'de> for RatingsVisitor {
            type Value = TraitRatings;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of trait names to integer ratings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TraitRatings, A::Error> {
                let mut ratings = TraitRatings::default();
                while let Some((name, value)) = access.next_entry::<String, i32>()? {
                    ratings.set(&name, value);
                }
                Ok(ratings)
            }
        }

        deserializer.deserialize_map(RatingsVisitor)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// One persisted scouting report.
///
/// `report_tag`, `intangibles` and `player_id` are missing from reports
/// written by older versions, so they tolerate absence on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoutingReport {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub player_id: PlayerId,
    /// Human-readable local timestamp.
    pub created_at: String,
    #[serde(default)]
    pub report_tag: Option<ReportTag>,
    pub strengths: String,
    pub weaknesses: String,
    #[serde(default)]
    pub intangibles: String,
    pub comparison: String,
    pub fit: String,
    pub role: ProjectedRole,
    pub ceiling: Ceiling,
    pub range: DraftRange,
    pub ratings: TraitRatings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Display timestamp in the `10/18/2026, 2:30:22 PM` style.
pub fn display_timestamp(at: DateTime<Local>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Candidate report id derived from the submission instant. Collisions are
/// resolved by the store.
pub fn mint_report_id(at: DateTime<Local>) -> String {
    at.format("report_%Y%m%d_%H%M%S_%3f").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

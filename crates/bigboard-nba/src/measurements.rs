// Combine measurements against the rest of the class.

use bigboard_core::dataset::{Dataset, Measurement, MeasurementField, PlayerId};

// Band thresholds on `value - peer_average`.
const ELITE_DIFF: f64 = 5.0;
const ABOVE_DIFF: f64 = 1.0;
const TIMED_ELITE_DIFF: f64 = 0.3;
const TIMED_ABOVE_DIFF: f64 = 0.1;

/// Differences are compared at this many decimal places.
const DIFF_SCALE: f64 = 1000.0;

/// Timed drills, where a smaller number is the better result.
pub fn lower_is_better(field: MeasurementField) -> bool {
    matches!(field, MeasurementField::Sprint | MeasurementField::Agility)
}

/// Qualitative band of one measurement relative to peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Elite,
    AboveAverage,
    Average,
    BelowAverage,
    NotAvailable,
}

impl Band {
    pub fn label(self) -> &'static str {
        match self {
            Band::Elite => "Elite",
            Band::AboveAverage => "Above Average",
            Band::Average => "Average",
            Band::BelowAverage => "Below Average",
            Band::NotAvailable => "N/A",
        }
    }
}

/// Mean of every present, finite `field` value among records other than the
/// subject's. `None` when no peer has one.
pub fn peer_average(subject: PlayerId, all: &[Measurement], field: MeasurementField) -> Option<f64> {
    let values: Vec<f64> = all
        .iter()
        .filter(|m| m.player_id != subject)
        .filter_map(|m| m.value(field))
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn classify(field: MeasurementField, value: Option<f64>, peer_average: Option<f64>) -> Band {
    let (Some(value), Some(average)) = (value, peer_average) else {
        return Band::NotAvailable;
    };
    let diff = ((value - average) * DIFF_SCALE).round() / DIFF_SCALE;
    if lower_is_better(field) {
        if diff <= -TIMED_ELITE_DIFF {
            Band::Elite
        } else if diff <= -TIMED_ABOVE_DIFF {
            Band::AboveAverage
        } else if diff >= TIMED_ELITE_DIFF {
            Band::BelowAverage
        } else {
            Band::Average
        }
    } else if diff >= ELITE_DIFF {
        Band::Elite
    } else if diff >= ABOVE_DIFF {
        Band::AboveAverage
    } else if diff <= -ABOVE_DIFF {
        Band::BelowAverage
    } else {
        Band::Average
    }
}

// ---------------------------------------------------------------------------
// Comparison rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FieldComparison {
    pub field: MeasurementField,
    pub value: Option<f64>,
    pub peer_average: Option<f64>,
    pub band: Band,
}

impl FieldComparison {
    pub fn display_value(&self) -> String {
        format_value(self.field, self.value)
    }

    /// Peer average to one decimal, or `N/A`.
    pub fn display_average(&self) -> String {
        match self.peer_average {
            Some(avg) => format!("{avg:.1}"),
            None => "N/A".to_string(),
        }
    }
}

/// Compare `subject` to every other record, field by field.
pub fn compare(subject: &Measurement, all: &[Measurement], fields: &[MeasurementField]) -> Vec<FieldComparison> {
    fields
        .iter()
        .map(|&field| {
            let value = subject.value(field).filter(|v| v.is_finite());
            let peer_average = peer_average(subject.player_id, all, field);
            FieldComparison {
                field,
                value,
                peer_average,
                band: classify(field, value, peer_average),
            }
        })
        .collect()
}

/// Value with its unit suffix, or `N/A`.
pub fn format_value(field: MeasurementField, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}{}", field.unit()),
        None => "N/A".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Multi-player chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementChartRow {
    pub field: MeasurementField,
    /// One entry per requested player, in request order.
    pub values: Vec<(PlayerId, Option<f64>)>,
}

pub fn measurement_chart(dataset: &Dataset, players: &[PlayerId], fields: &[MeasurementField]) -> Vec<MeasurementChartRow> {
    fields
        .iter()
        .map(|&field| MeasurementChartRow {
            field,
            values: players
                .iter()
                .map(|&id| (id, dataset.measurement(id).and_then(|m| m.value(field))))
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

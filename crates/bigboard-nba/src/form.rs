// Scouting report form: the in-progress evaluation and its validation.

use thiserror::Error;
use tracing::debug;

use bigboard_core::dataset::PlayerId;
use bigboard_core::report::{
    Ceiling, DraftRange, ProjectedRole, ReportTag, ScoutingReport, TraitRatings, MAX_RATING,
    MIN_RATING, TRAITS,
};

pub const INCOMPLETE_MESSAGE: &str = "Please complete all fields before submitting.";

/// A form that cannot be submitted. Displays as one user-facing message;
/// `missing` names the offending fields for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please complete all fields before submitting.")]
pub struct ValidationError {
    pub missing: Vec<String>,
}

/// User-entered evaluation, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportForm {
    pub report_tag: Option<ReportTag>,
    pub strengths: String,
    pub weaknesses: String,
    pub intangibles: String,
    pub comparison: String,
    pub fit: String,
    pub role: Option<ProjectedRole>,
    pub ceiling: Option<Ceiling>,
    pub range: Option<DraftRange>,
    pub ratings: TraitRatings,
}

impl Default for ReportForm {
    fn default() -> Self {
        Self {
            report_tag: None,
            strengths: String::new(),
            weaknesses: String::new(),
            intangibles: String::new(),
            comparison: String::new(),
            fit: String::new(),
            role: None,
            ceiling: None,
            range: None,
            ratings: TraitRatings::defaults(),
        }
    }
}

/// A form that passed validation, with text fields trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub report_tag: ReportTag,
    pub strengths: String,
    pub weaknesses: String,
    pub intangibles: String,
    pub comparison: String,
    pub fit: String,
    pub role: ProjectedRole,
    pub ceiling: Ceiling,
    pub range: DraftRange,
    pub ratings: TraitRatings,
}

impl ReportForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rating(&mut self, name: &str, value: i32) {
        self.ratings.set(name, value);
    }

    /// Back to an empty form with every rating at the default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Names of every field that blocks submission.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.report_tag.is_none() {
            missing.push("reportTag".to_string());
        }
        for (name, value) in [
            ("strengths", &self.strengths),
            ("weaknesses", &self.weaknesses),
            ("intangibles", &self.intangibles),
            ("comparison", &self.comparison),
            ("fit", &self.fit),
        ] {
            if value.trim().is_empty() {
                missing.push(name.to_string());
            }
        }
        if self.role.is_none() {
            missing.push("role".to_string());
        }
        if self.ceiling.is_none() {
            missing.push("ceiling".to_string());
        }
        if self.range.is_none() {
            missing.push("range".to_string());
        }
        for name in TRAITS {
            match self.ratings.get(name) {
                Some(v) if (MIN_RATING..=MAX_RATING).contains(&v) => {}
                _ => missing.push(format!("ratings.{name}")),
            }
        }
        for (name, v) in self.ratings.iter() {
            if !TRAITS.contains(&name) && !(MIN_RATING..=MAX_RATING).contains(&v) {
                missing.push(format!("ratings.{name}"));
            }
        }
        missing
    }

    pub fn validate(&self) -> Result<Evaluation, ValidationError> {
        let missing = self.missing_fields();
        let (Some(report_tag), Some(role), Some(ceiling), Some(range), true) = (
            self.report_tag,
            self.role,
            self.ceiling,
            self.range,
            missing.is_empty(),
        ) else {
            debug!(?missing, "report form incomplete");
            return Err(ValidationError { missing });
        };
        Ok(Evaluation {
            report_tag,
            strengths: self.strengths.trim().to_string(),
            weaknesses: self.weaknesses.trim().to_string(),
            intangibles: self.intangibles.trim().to_string(),
            comparison: self.comparison.trim().to_string(),
            fit: self.fit.trim().to_string(),
            role,
            ceiling,
            range,
            ratings: self.ratings.clone(),
        })
    }
}

impl Evaluation {
    pub fn into_report(self, player_id: PlayerId, id: String, created_at: String) -> ScoutingReport {
        ScoutingReport {
            id,
            player_id,
            created_at,
            report_tag: Some(self.report_tag),
            strengths: self.strengths,
            weaknesses: self.weaknesses,
            intangibles: self.intangibles,
            comparison: self.comparison,
            fit: self.fit,
            role: self.role,
            ceiling: self.ceiling,
            range: self.range,
            ratings: self.ratings,
            summary: None,
        }
    }
}

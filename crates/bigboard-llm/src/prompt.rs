// Prompt construction for scouting summaries.
//
// The report's free-text fields go in verbatim next to a rating-derived
// archetype label and the full trait sheet, so the model writes prose around
// numbers it does not have to interpret from scratch.

use bigboard_core::report::{ScoutingReport, TraitRatings};

// ---------------------------------------------------------------------------
// Archetypes
// ---------------------------------------------------------------------------

/// Ordered archetype rules: every listed trait must meet its minimum.
/// First match wins.
const ARCHETYPES: &[(&str, &[(&str, i32)])] = &[
    ("3&D Wing", &[("Shooting", 7), ("Perimeter Defense", 7), ("Motor", 7)]),
    (
        "Playmaking Guard",
        &[("Playmaking", 8), ("Ball Handling", 7), ("Shooting", 6)],
    ),
    (
        "Athletic Slasher",
        &[("Finishing", 8), ("Athleticism", 8), ("Ball Handling", 6)],
    ),
    (
        "Post Specialist",
        &[("Post Defense", 8), ("Rebounding", 8), ("Finishing", 7)],
    ),
    (
        "Two-Way Forward",
        &[("Help Defense", 7), ("IQ", 7), ("Finishing", 7), ("Motor", 7)],
    ),
    (
        "Defensive Anchor",
        &[("Post Defense", 8), ("Help Defense", 8), ("Rebounding", 8)],
    ),
];

pub const DEFAULT_ARCHETYPE: &str = "Versatile Prospect";

/// Classify a rating sheet. Missing traits count as 0.
pub fn determine_archetype(ratings: &TraitRatings) -> &'static str {
    ARCHETYPES
        .iter()
        .find(|(_, mins)| {
            mins.iter()
                .all(|(name, min)| ratings.get(name).unwrap_or(0) >= *min)
        })
        .map(|(label, _)| *label)
        .unwrap_or(DEFAULT_ARCHETYPE)
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

pub fn system_prompt() -> String {
    "You are an NBA draft scout writing concise evaluation summaries for a front office.\n\
     Write in plain prose, third person, present tense. No headings, no bullet points.\n\
     Do not invent statistics or measurements that are not in the evaluation."
        .to_string()
}

/// Build the user message for one report.
pub fn build_summary_prompt(report: &ScoutingReport) -> String {
    let intangibles = if report.intangibles.trim().is_empty() {
        "N/A"
    } else {
        report.intangibles.as_str()
    };

    let mut prompt = String::new();
    prompt.push_str(
        "Generate a 5-7 sentence NBA draft scouting summary based on the following evaluation:\n",
    );
    prompt.push_str(&format!("Strengths: {}\n", report.strengths));
    prompt.push_str(&format!("Weaknesses: {}\n", report.weaknesses));
    prompt.push_str(&format!("Intangibles: {intangibles}\n"));
    prompt.push_str(&format!("Player Comparison: {}\n", report.comparison));
    prompt.push_str(&format!("Team Fit: {}\n", report.fit));
    prompt.push_str(&format!("Projected Role: {}\n", report.role));
    prompt.push_str(&format!("Ceiling: {}\n", report.ceiling));
    prompt.push_str(&format!("Draft Range: {}\n", report.range));
    prompt.push_str(&format!(
        "Archetype: {}\n\n",
        determine_archetype(&report.ratings)
    ));
    prompt.push_str(
        "From the trait ratings below, highlight strengths with a rating of 8 or higher \
         and weaknesses with a rating of 3 or lower, but do not repeat traits already \
         mentioned in the Strengths or Weaknesses section.\n\n",
    );
    prompt.push_str("Trait Ratings:\n");
    prompt.push_str(&format_ratings(&report.ratings));
    prompt
}

fn format_ratings(ratings: &TraitRatings) -> String {
    ratings
        .iter()
        .map(|(name, value)| format!("- {name}: {value}/10\n"))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

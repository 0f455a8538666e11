// Rule-based scouting summary, built from a report without any network call.

use bigboard_core::report::ScoutingReport;

const TOP_TRAIT_MIN: i32 = 8;
const WEAK_TRAIT_MAX: i32 = 4;

const STRENGTH_KEYWORDS: [&str; 8] = [
    "versatile",
    "shooter",
    "defender",
    "motor",
    "explosive",
    "leader",
    "playmaker",
    "rebounder",
];

const CONCERN_KEYWORDS: [&str; 8] = [
    "inconsistent",
    "raw",
    "injury",
    "turnover",
    "slow",
    "undersized",
    "streaky",
    "foul trouble",
];

/// Predicate over lowercased text, paired with the phrase it yields.
type PhraseRule = (fn(&str) -> bool, &'static str);

const STRENGTH_RULES: [PhraseRule; 4] = [
    (
        |t| t.contains("drive") || t.contains("rim"),
        "noted for elite driving ability",
    ),
    (
        |t| t.contains("quick first step"),
        "possesses a quick first step",
    ),
    (|t| t.contains("shoot"), "has advanced shooting mechanics"),
    (
        |t| t.contains("defense") && t.contains("versatile"),
        "defends multiple positions effectively",
    ),
];

const WEAKNESS_RULES: [PhraseRule; 4] = [
    (
        |t| t.contains("turnover"),
        "struggles with turnovers under pressure",
    ),
    (
        |t| t.contains("cost") || t.contains("mistake"),
        "has made costly mistakes in big moments",
    ),
    (
        |t| t.contains("decision") && t.contains("poor"),
        "needs to improve decision-making",
    ),
    (
        |t| t.contains("defense"),
        "has lapses in defensive consistency",
    ),
];

/// Keywords from `vocabulary` found anywhere in `text`, in vocabulary order.
pub fn keywords(text: &str, vocabulary: &[&'static str]) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    vocabulary
        .iter()
        .copied()
        .filter(|word| lower.contains(word))
        .collect()
}

/// Phrase of the first rule whose predicate holds.
pub fn first_phrase(text: &str, rules: &[PhraseRule]) -> Option<&'static str> {
    let lower = text.to_lowercase();
    rules
        .iter()
        .find(|(matches, _)| matches(&lower))
        .map(|(_, phrase)| *phrase)
}

pub fn strength_phrase(text: &str) -> Option<&'static str> {
    first_phrase(text, &STRENGTH_RULES)
}

pub fn weakness_phrase(text: &str) -> Option<&'static str> {
    first_phrase(text, &WEAKNESS_RULES)
}

/// Sentence describing how far the ceiling sits above the projected role.
pub fn gap_sentence(report: &ScoutingReport) -> &'static str {
    let gap = report.ceiling.tier() as i64 - report.role.tier() as i64;
    if gap >= 3 {
        "High variance prospect with significant upside beyond current role."
    } else if gap == 2 {
        "Moderate gap between role and ceiling with growth potential."
    } else {
        "Projection aligns closely with current role."
    }
}

/// Build the local summary paragraph.
pub fn local_summary(report: &ScoutingReport) -> String {
    let top: Vec<&str> = report
        .ratings
        .iter()
        .filter(|(_, v)| *v >= TOP_TRAIT_MIN)
        .map(|(name, _)| name)
        .collect();
    let weak: Vec<&str> = report
        .ratings
        .iter()
        .filter(|(_, v)| *v <= WEAK_TRAIT_MAX)
        .map(|(name, _)| name)
        .collect();
    let strength_words = keywords(&report.strengths, &STRENGTH_KEYWORDS);
    let concern_words = keywords(&report.weaknesses, &CONCERN_KEYWORDS);

    let mut sentences: Vec<String> = Vec::new();
    if !top.is_empty() {
        sentences.push(format!("Strong traits include {}.", top.join(", ")));
    }
    if let Some(phrase) = strength_phrase(&report.strengths) {
        sentences.push(format!("Also {phrase}."));
    }
    if !strength_words.is_empty() {
        sentences.push(format!("Described as {}.", strength_words.join(", ")));
    }
    if !weak.is_empty() {
        sentences.push(format!("Needs development in {}.", weak.join(", ")));
    }
    if !concern_words.is_empty() {
        sentences.push(format!("Concerns include {}.", concern_words.join(", ")));
    }
    if let Some(phrase) = weakness_phrase(&report.weaknesses) {
        sentences.push(format!("However, {phrase}."));
    }
    sentences.push(gap_sentence(report).to_string());
    sentences.push(format!(
        "Compared to {}, fits best with {}, and is expected to be drafted in the {} range.",
        or_na(&report.comparison),
        or_na(&report.fit),
        report.range
    ));

    sentences.join(" ")
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigboard_core::report::{Ceiling, DraftRange, ProjectedRole, ReportTag, TraitRatings};

    fn report(strengths: &str, weaknesses: &str) -> ScoutingReport {
        ScoutingReport {
            id: "r".into(),
            player_id: 1,
            created_at: "t".into(),
            report_tag: Some(ReportTag::PreDraft),
            strengths: strengths.into(),
            weaknesses: weaknesses.into(),
            intangibles: "competitive".into(),
            comparison: "Mikal Bridges".into(),
            fit: "Spurs".into(),
            role: ProjectedRole::RolePlayer,
            ceiling: Ceiling::Starter,
            range: DraftRange::Mid1st,
            ratings: TraitRatings::defaults(),
            summary: None,
        }
    }

    #[test]
    fn neutral_report_has_gap_and_closing_only() {
        let r = report("Solid", "Thin frame");
        assert_eq!(
            local_summary(&r),
            "Projection aligns closely with current role. Compared to Mikal Bridges, fits best \
             with Spurs, and is expected to be drafted in the Mid 1st range."
        );
    }

    #[test]
    fn sentences_in_fixed_order() {
        let mut r = report(
            "Explosive shooter who attacks the rim",
            "Streaky, raw, commits a turnover or two",
        );
        r.ratings.set("Shooting", 9);
        r.ratings.set("Athleticism", 8);
        r.ratings.set("Post Defense", 3);
        r.ceiling = Ceiling::AllNba;

        let summary = local_summary(&r);
        assert_eq!(
            summary,
            "Strong traits include Shooting, Athleticism. \
             Also noted for elite driving ability. \
             Described as shooter, explosive. \
             Needs development in Post Defense. \
             Concerns include raw, turnover, streaky. \
             However, struggles with turnovers under pressure. \
             High variance prospect with significant upside beyond current role. \
             Compared to Mikal Bridges, fits best with Spurs, and is expected to be drafted in the Mid 1st range."
        );
    }

    #[test]
    fn first_matching_strength_rule_wins() {
        assert_eq!(
            strength_phrase("Great shooter, quick first step"),
            Some("possesses a quick first step")
        );
        assert_eq!(
            strength_phrase("VERSATILE on DEFENSE"),
            Some("defends multiple positions effectively")
        );
        assert_eq!(strength_phrase("long arms"), None);
    }

    #[test]
    fn weakness_rules() {
        assert_eq!(
            weakness_phrase("Costly fouls"),
            Some("has made costly mistakes in big moments")
        );
        assert_eq!(
            weakness_phrase("Poor decision maker"),
            Some("needs to improve decision-making")
        );
        assert_eq!(
            weakness_phrase("Team defense lapses"),
            Some("has lapses in defensive consistency")
        );
    }

    #[test]
    fn keywords_are_case_insensitive_substrings() {
        assert_eq!(
            keywords("Prone to FOUL TROUBLE and injury", &CONCERN_KEYWORDS),
            vec!["injury", "foul trouble"]
        );
    }

    #[test]
    fn moderate_gap() {
        let mut r = report("", "");
        r.role = ProjectedRole::Bench;
        r.ceiling = Ceiling::HighLevelStarter;
        assert_eq!(
            gap_sentence(&r),
            "Moderate gap between role and ceiling with growth potential."
        );
    }

    #[test]
    fn empty_comparison_and_fit_read_na() {
        let mut r = report("", "");
        r.comparison = " ".into();
        r.fit = String::new();
        assert!(local_summary(&r).ends_with(
            "Compared to N/A, fits best with N/A, and is expected to be drafted in the Mid 1st range."
        ));
    }
}

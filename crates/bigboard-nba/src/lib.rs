// Prospect evaluation: big board ranking, combine measurement banding,
// season statistics, the scouting report form, and the rule-based summary.

pub mod form;
pub mod measurements;
pub mod ranking;
pub mod stats;
pub mod summary;

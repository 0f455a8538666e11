// Application layer: wires config, dataset, storage and the summary client
// into board, profile and scouting-session operations.

pub mod app;
pub mod logging;
pub mod profile;
pub mod session;

// Shared foundations: configuration, the read-only prospect dataset, the
// scouting report model, and durable report storage.

pub mod config;
pub mod dataset;
pub mod db;
pub mod report;
pub mod store;

pub mod access;
pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod history;
pub mod portfolio;
pub mod sequence;
pub mod telemetry;

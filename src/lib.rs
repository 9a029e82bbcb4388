pub mod api;
pub mod cli;
pub mod core;
pub mod export;
pub mod settings;
pub mod telemetry;

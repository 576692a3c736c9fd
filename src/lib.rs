pub mod commands;
pub mod config;
pub mod logging;
pub mod manifest;
pub mod report;
pub mod update;
pub mod version;

pub mod config;
pub mod logging;

// Estimation core
pub mod engine;
pub mod format;
pub mod history;
pub mod job;
pub mod render;
pub mod ticker;

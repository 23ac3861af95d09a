/// State management module
///
/// This module handles all gallery state, including:
/// - Content data structures (data.rs)
/// - The per-cell deferred loader state machine (load.rs)
/// - Grid and loader configuration (config.rs)

pub mod config;
pub mod data;
pub mod load;

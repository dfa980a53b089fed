// MatchMaker - create model matching rules for VATSIM vPilot
//
// This is the library crate containing the rule engine, configuration handling and
// session state. The binary crate (main.rs) provides the command line entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod rules;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{CustomData, Livery, MatchMakerConfig, RuleTables, SessionState};
pub use rules::{CountingPolicy, RuleDocument, RuleSet};
pub use services::LiveryCommand;
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

//! Data models for MatchMaker.
//!
//! - [`SessionState`]: The session container holding configuration, liveries, rules and dirty flags
//! - [`MatchMakerConfig`]: Paths, rule tables and custom data loaded from `MatchMaker.yaml`
//! - [`RuleTables`]: The `default_types`, `type_variations` and `icao_variations` tables
//! - [`CustomData`]: Per-livery overrides keyed by the livery source key
//! - [`Livery`]: One livery variation as delivered by the livery scanner
//!
//! # Architecture Note
//!
//! Config structs derive `Serialize`/`Deserialize` for YAML persistence. The session
//! is wrapped in `Arc<RwLock<>>` by [`StateManager`](crate::state::StateManager) and
//! updated through its methods only.

pub mod config;
pub mod livery;
pub mod session;

pub use config::{ConfigTable, CustomData, CustomEntry, MatchMakerConfig, PathsConfig, RuleTables};
pub use livery::{Livery, LiveryCatalogEntry, build_liveries};
pub use session::SessionState;

//! Services module - livery edits and file persistence.
//!
//! These services have no dependencies on a user interface and take all inputs
//! as explicit parameters.
//!
//! # Components
//!
//! - [`LiveryCommand`]: User edits of a livery (eligibility, airline code override),
//!   applied to an owned livery list together with the [`CustomData`](crate::models::CustomData)
//!   that persists them
//! - [`write_with_backup`]: Writes a file after copying any previous version to `<file>.bak`
//!
//! # Usage Example
//!
//! ```ignore
//! use camino::Utf8Path;
//! use matchmaker::services::{LiveryCommand, write_with_backup};
//!
//! let command = LiveryCommand::SetOverrideCode {
//!     source_key: "Community/livery-ewg/aircraft.cfg".into(),
//!     code: "EWG".into(),
//! };
//! command.apply(&mut liveries, &mut custom_data)?;
//!
//! write_with_backup(Utf8Path::new("MatchMakingRulesUI.vmr"), &document.text)?;
//! ```

pub mod overrides;
pub mod persistence;

pub use overrides::{LiveryCommand, OverrideError};
pub use persistence::{PersistenceError, backup_path, create_backup, write_with_backup};

use crate::models::livery::clean_value;
use crate::models::{CustomData, CustomEntry, Livery};
use thiserror::Error;

/// Errors that can occur when applying a livery command
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OverrideError {
    #[error("Livery {0} not found")]
    LiveryNotFound(String),
}

/// A user edit of a livery.
///
/// Commands update both the livery list and the custom data that persists the
/// edit. Rules are not recalculated; callers do that explicitly afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveryCommand {
    /// Include or exclude a livery from rule generation
    SetEligibility { source_key: String, eligible: bool },

    /// Replace the airline code of a livery; an empty code removes the override
    SetOverrideCode { source_key: String, code: String },

    /// Delete the custom data entry and restore the scanned values
    RemoveOverride { source_key: String },
}

impl LiveryCommand {
    pub fn source_key(&self) -> &str {
        match self {
            LiveryCommand::SetEligibility { source_key, .. }
            | LiveryCommand::SetOverrideCode { source_key, .. }
            | LiveryCommand::RemoveOverride { source_key } => source_key,
        }
    }

    /// Apply the command.
    ///
    /// # Returns
    /// `true` if the livery or the custom data changed
    ///
    /// # Errors
    /// [`OverrideError::LiveryNotFound`] if no livery has the source key
    pub fn apply(
        &self,
        liveries: &mut [Livery],
        custom: &mut CustomData,
    ) -> Result<bool, OverrideError> {
        let livery = liveries
            .iter_mut()
            .find(|l| l.source_key == self.source_key())
            .ok_or_else(|| OverrideError::LiveryNotFound(self.source_key().to_string()))?;

        let changed = match self {
            LiveryCommand::SetEligibility { eligible, .. } => {
                set_eligibility(livery, custom, *eligible)
            }
            LiveryCommand::SetOverrideCode { code, .. } => {
                let code = clean_value(code);
                if code.is_empty() {
                    clear_override(livery, custom)
                } else {
                    set_override(livery, custom, code)
                }
            }
            LiveryCommand::RemoveOverride { .. } => remove_override(livery, custom),
        };

        if changed {
            tracing::info!(
                "Applied {:?}: code={}, eligible={}, complete={}",
                self,
                livery.icao_code,
                livery.eligible,
                livery.complete
            );
        }
        Ok(changed)
    }
}

fn set_eligibility(livery: &mut Livery, custom: &mut CustomData, eligible: bool) -> bool {
    let data_changed = custom.set_process_flag(&livery.source_key, eligible, &livery.icao_code);
    let new_eligible = eligible && livery.complete;
    let livery_changed = livery.eligible != new_eligible;
    livery.eligible = new_eligible;
    data_changed || livery_changed
}

fn set_override(livery: &mut Livery, custom: &mut CustomData, code: String) -> bool {
    let process = custom
        .get(&livery.source_key)
        .map_or(livery.eligible, |entry| entry.process);

    let data_changed = custom.add_or_change(
        &livery.source_key,
        CustomEntry {
            process,
            original_icao: livery.original_code.clone(),
            custom_icao: code.clone(),
        },
    );

    let before = livery.clone();
    livery.icao_code = code;
    livery.has_override = true;
    livery.refresh_complete();
    livery.eligible = process && livery.complete;
    data_changed || *livery != before
}

fn clear_override(livery: &mut Livery, custom: &mut CustomData) -> bool {
    let mut data_changed = false;
    let mut process = livery.eligible;
    if let Some(entry) = custom.get_mut(&livery.source_key) {
        process = entry.process;
        if !entry.custom_icao.is_empty() {
            entry.custom_icao.clear();
            data_changed = true;
        }
    }

    let before = livery.clone();
    livery.icao_code = livery.original_code.clone();
    livery.has_override = false;
    livery.refresh_complete();
    livery.eligible = process && livery.complete;
    data_changed || *livery != before
}

fn remove_override(livery: &mut Livery, custom: &mut CustomData) -> bool {
    let data_changed = custom.remove(&livery.source_key).is_some();

    let before = livery.clone();
    livery.icao_code = livery.original_code.clone();
    livery.has_override = false;
    livery.refresh_complete();
    livery.eligible = livery.complete;
    data_changed || *livery != before
}

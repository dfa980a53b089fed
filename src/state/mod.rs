// State management module
//
// This module provides the StateManager which wraps SessionState with thread-safe access
// using Arc<RwLock<T>> and emits change events for UI and CLI listeners.

use crate::config::ConfigManager;
use crate::metrics::Metrics;
use crate::models::{Livery, MatchMakerConfig, SessionState};
use crate::rules::{self, CountingPolicy};
use crate::services::{LiveryCommand, OverrideError, PersistenceError, write_with_backup};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events notify interested parties (a UI, the CLI) about state changes
/// without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Configuration tables, custom data or counting policy changed
    ConfigurationChanged,

    /// The livery list changed
    LiveriesChanged { found: usize, queued: usize },

    /// Rules have been recalculated
    RulesCalculated { mappings: usize, airlines: usize },

    /// A new rule document has been rendered
    DocumentGenerated { rule_lines: usize },

    /// The rules dirty flag changed
    RulesDirtyChanged { dirty: bool },

    /// The configuration dirty flag changed
    ConfigDirtyChanged { dirty: bool },

    /// The rule document has been saved
    RulesSaved { path: Utf8PathBuf },
}

/// Thread-safe session manager with event emission
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`SessionState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Runs rule recalculation under the write lock, so concurrent callers are serialized
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`apply_command()`](Self::apply_command) for livery edits, followed by
///   [`recalculate()`](Self::recalculate)
/// - [`save_rules()`](Self::save_rules) to persist the rule document
pub struct StateManager {
    /// The session state protected by RwLock for thread-safe access
    state: Arc<RwLock<SessionState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,

    metrics: Arc<Metrics>,
}

impl StateManager {
    /// Create a new StateManager with an empty session
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        Self::with_state(SessionState::default())
    }

    /// Create a StateManager for a loaded configuration
    pub fn with_config(config: &MatchMakerConfig) -> Self {
        Self::with_state(SessionState::from_config(config))
    }

    fn with_state(state: SessionState) -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(state)),
            state_tx,
            metrics: Arc::new(Metrics::new()),
        }
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.read_lock().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let unsaved = state_manager.read(|state| state.has_unsaved_changes());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        let state = self.read_lock();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut SessionState),
    {
        let mut state = self.write_lock();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = detect_changes(&old_state, &state);
        drop(state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }
        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Run metrics of this session
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    // Convenience methods for common state updates

    /// Load configuration into the session without marking it dirty
    pub fn load_from_config(&self, config: &MatchMakerConfig) -> Vec<StateChange> {
        self.update(|state| {
            state.apply_config(config);
            tracing::info!(
                "Loaded config: {} default types, {} type variations, {} icao variations, {} custom entries",
                state.tables.default_types.len(),
                state.tables.type_variations.len(),
                state.tables.icao_variations.len(),
                state.custom_data.len()
            );
        })
    }

    /// Apply an edited configuration, e.g. from a configuration editor.
    ///
    /// Unlike [`load_from_config()`](Self::load_from_config) a change marks the
    /// configuration and the rules dirty.
    pub fn apply_config_edit(&self, config: &MatchMakerConfig) -> Vec<StateChange> {
        self.update(|state| {
            if state.to_config() != *config {
                state.apply_config(config);
                state.mark_config_changed();
            }
        })
    }

    /// Set the livery catalog the session is built from
    pub fn set_livery_catalog(&self, path: Utf8PathBuf) -> Vec<StateChange> {
        self.update(|state| {
            if state.paths.livery_catalog != path {
                state.paths.livery_catalog = path;
                state.config_dirty = true;
            }
        })
    }

    /// Set the target of the rule document; the rules count as unsaved there
    pub fn set_output_file(&self, path: Utf8PathBuf) -> Vec<StateChange> {
        self.update(|state| {
            if state.paths.output_file != path {
                state.paths.output_file = path;
                state.mark_config_changed();
            }
        })
    }

    /// Replace the livery list
    pub fn set_liveries(&self, liveries: Vec<Livery>) -> Vec<StateChange> {
        self.update(|state| state.liveries = liveries)
    }

    /// Remove all liveries
    pub fn clear_liveries(&self) -> Vec<StateChange> {
        self.set_liveries(Vec::new())
    }

    /// Apply a livery edit.
    ///
    /// A change marks configuration and rules dirty; the rules themselves are
    /// only recalculated by [`recalculate()`](Self::recalculate).
    pub fn apply_command(&self, command: &LiveryCommand) -> Result<Vec<StateChange>, OverrideError> {
        let mut result = Ok(false);
        let changes = self.update(|state| {
            result = command.apply(&mut state.liveries, &mut state.custom_data);
            if matches!(result, Ok(true)) {
                state.mark_config_changed();
            }
        });
        result.map(|_| changes)
    }

    /// Add or replace the default livery titles of a base container
    pub fn add_default_type(&self, base_container: &str, titles: Vec<String>) -> Vec<StateChange> {
        self.update(|state| {
            if state.tables.add_default_type(base_container, titles) {
                state.mark_config_changed();
            }
        })
    }

    /// Remove a base container from the default types
    pub fn remove_default_type(&self, base_container: &str) -> Vec<StateChange> {
        self.update(|state| {
            if state.tables.remove_default_type(base_container).is_some() {
                state.mark_config_changed();
            }
        })
    }

    /// Select how rule mappings are counted
    pub fn set_counting_policy(&self, policy: CountingPolicy) -> Vec<StateChange> {
        self.update(|state| {
            if state.counting_policy != policy {
                state.counting_policy = policy;
                state.mark_config_changed();
            }
        })
    }

    /// Recalculate the rules and render the rule document.
    ///
    /// The previous results are replaced completely. Always marks the rules dirty.
    pub fn recalculate(&self) -> Vec<StateChange> {
        let started = Instant::now();
        let changes = self.update(|state| {
            let rule_set = rules::calculate_rules(&state.liveries, &state.tables, state.counting_policy);
            let document = rules::generate_document(&rule_set.mapping, &state.tables);

            tracing::info!(
                "Recalculated rules: {} liveries queued, {} mappings, {} rule lines",
                state.queued_count(),
                rule_set.counter,
                document.rule_lines
            );

            state.rules = rule_set;
            state.document = Some(document);
            state.rules_generation += 1;
            state.rules_dirty = true;
        });
        self.metrics.record_recalculation(started.elapsed());
        changes
    }

    /// Save the rule document to `path`, backing up any previous file.
    ///
    /// Renders the document first if the session has none. On failure the
    /// session is left untouched and the rules stay dirty. If the rules were
    /// recalculated while the file was written, the saved document is already
    /// stale and the rules stay dirty.
    pub fn save_rules(&self, path: &Utf8Path) -> Result<Vec<StateChange>, PersistenceError> {
        self.save_rules_with(path, |path, text| write_with_backup(path, text).map(|_| ()))
    }

    fn save_rules_with<W>(&self, path: &Utf8Path, write: W) -> Result<Vec<StateChange>, PersistenceError>
    where
        W: FnOnce(&Utf8Path, &str) -> Result<(), PersistenceError>,
    {
        let (generation, text) = self.read(|state| {
            let text = match &state.document {
                Some(document) => document.text.clone(),
                None => rules::generate_document(&state.rules.mapping, &state.tables).text,
            };
            (state.rules_generation, text)
        });

        // The lock is not held during file I/O
        if let Err(e) = write(path, &text) {
            tracing::error!("Saving rules to {} failed: {}", path, e);
            self.metrics.record_save_failed();
            return Err(e);
        }
        self.metrics.record_rules_saved();

        let mut changes = self.update(|state| {
            if state.rules_generation == generation {
                state.rules_dirty = false;
            } else {
                tracing::warn!(
                    "Rules recalculated while saving to {}, saved generation {} is stale",
                    path,
                    generation
                );
            }
            state.last_saved_rules = Some(path.to_path_buf());
        });

        let saved_event = StateChange::RulesSaved {
            path: path.to_path_buf(),
        };
        let _ = self.state_tx.send(saved_event.clone());
        changes.push(saved_event);

        Ok(changes)
    }

    /// Save the session configuration and clear the configuration dirty flag
    pub fn save_config(&self, config_manager: &ConfigManager) -> anyhow::Result<Vec<StateChange>> {
        let config = self.read(SessionState::to_config);
        config_manager.save_config(&config)?;
        Ok(self.update(|state| state.config_dirty = false))
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect what changed between two states and generate events
fn detect_changes(old: &SessionState, new: &SessionState) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if old.tables != new.tables
        || old.custom_data != new.custom_data
        || old.counting_policy != new.counting_policy
        || old.paths != new.paths
    {
        changes.push(StateChange::ConfigurationChanged);
    }

    if old.liveries != new.liveries {
        changes.push(StateChange::LiveriesChanged {
            found: new.found_count(),
            queued: new.queued_count(),
        });
    }

    if old.rules_generation != new.rules_generation {
        changes.push(StateChange::RulesCalculated {
            mappings: new.rules.counter,
            airlines: new.rules.airline_codes().len(),
        });
        if let Some(document) = &new.document {
            changes.push(StateChange::DocumentGenerated {
                rule_lines: document.rule_lines,
            });
        }
    }

    if old.rules_dirty != new.rules_dirty {
        changes.push(StateChange::RulesDirtyChanged {
            dirty: new.rules_dirty,
        });
    }

    if old.config_dirty != new.config_dirty {
        changes.push(StateChange::ConfigDirtyChanged {
            dirty: new.config_dirty,
        });
    }

    changes
}

use crate::models::config::{CustomData, MatchMakerConfig, PathsConfig, RuleTables};
use crate::models::livery::Livery;
use crate::rules::{CountingPolicy, RuleDocument, RuleSet};
use camino::Utf8PathBuf;

/// Single source of truth for a MatchMaker session.
///
/// Holds the configuration tables, the livery list, the last calculated rules
/// with their rendered document, and the two dirty flags.
///
/// # Thread Safety
///
/// `SessionState` is wrapped in `Arc<RwLock<SessionState>>` by
/// [`crate::state::StateManager`]. Recalculation replaces [`rules`](Self::rules)
/// and [`document`](Self::document) as a whole under the write lock, so readers
/// never observe a partial result.
///
/// # Dirty flags
///
/// - `rules_dirty`: set by every recalculation and configuration change,
///   cleared by a successful save of the rule document
/// - `config_dirty`: set by configuration changes, cleared by a successful
///   save of the configuration
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    // Configuration
    pub paths: PathsConfig,
    pub tables: RuleTables,
    pub custom_data: CustomData,
    pub counting_policy: CountingPolicy,

    // Input
    pub liveries: Vec<Livery>,

    // Results
    pub rules: RuleSet,
    pub document: Option<RuleDocument>,
    pub rules_generation: u64,

    // Dirty state
    pub rules_dirty: bool,
    pub config_dirty: bool,
    pub last_saved_rules: Option<Utf8PathBuf>,
}

impl SessionState {
    /// Create a session from a loaded configuration
    pub fn from_config(config: &MatchMakerConfig) -> Self {
        let mut state = Self::default();
        state.apply_config(config);
        state
    }

    /// Replace the configuration parts of the session
    pub fn apply_config(&mut self, config: &MatchMakerConfig) {
        self.paths = config.paths.clone();
        self.tables = config.tables.clone();
        self.custom_data = config.custom_data.clone();
        self.counting_policy = config.counting_policy;
    }

    /// Build a configuration from the current session for saving
    pub fn to_config(&self) -> MatchMakerConfig {
        MatchMakerConfig {
            paths: self.paths.clone(),
            tables: self.tables.clone(),
            counting_policy: self.counting_policy,
            custom_data: self.custom_data.clone(),
        }
    }

    /// Number of liveries known to the session
    pub fn found_count(&self) -> usize {
        self.liveries.len()
    }

    /// Number of liveries the rule engine will use
    pub fn queued_count(&self) -> usize {
        self.liveries.iter().filter(|l| l.is_processable()).count()
    }

    /// Number of liveries carrying custom data
    pub fn custom_count(&self) -> usize {
        self.liveries.iter().filter(|l| l.has_override).count()
    }

    /// Check if there is anything unsaved
    pub fn has_unsaved_changes(&self) -> bool {
        self.rules_dirty || self.config_dirty
    }

    /// Mark both configuration and rules as changed
    pub fn mark_config_changed(&mut self) {
        self.config_dirty = true;
        self.rules_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_clean() {
        let state = SessionState::default();
        assert!(!state.has_unsaved_changes());
        assert_eq!(state.found_count(), 0);
        assert!(state.document.is_none());
        assert_eq!(state.rules.counter, 0);
    }

    #[test]
    fn test_config_round_trip() {
        let config = MatchMakerConfig::default();
        let state = SessionState::from_config(&config);
        assert_eq!(state.to_config(), config);
        assert!(!state.config_dirty);
    }

    #[test]
    fn test_counts() {
        let mut state = SessionState::default();
        let mut overridden = Livery::new("b", "Asobo_A320_NEO", "Lufthansa", "DLH");
        overridden.has_override = true;
        state.liveries = vec![
            Livery::new("a", "Asobo_A320_NEO", "Untitled", ""),
            overridden,
            Livery::new("c", "Asobo_CJ4", "Private", "PVT"),
        ];

        assert_eq!(state.found_count(), 3);
        assert_eq!(state.queued_count(), 2);
        assert_eq!(state.custom_count(), 1);
    }

    #[test]
    fn test_mark_config_changed_sets_both_flags() {
        let mut state = SessionState::default();
        state.mark_config_changed();
        assert!(state.config_dirty);
        assert!(state.rules_dirty);
    }
}

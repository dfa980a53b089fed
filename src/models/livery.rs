use crate::models::config::CustomData;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static QUOTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""+"#).expect("Invalid quote regex"));

/// One livery variation of a simulated aircraft.
///
/// Created by the livery scanner, mutated only through
/// [`LiveryCommand`](crate::services::LiveryCommand). The rule engine reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Livery {
    /// Originating aircraft.cfg (plus variation index), key for custom data
    pub source_key: String,
    pub base_container: String,
    pub title: String,
    pub icao_code: String,
    /// Airline code as found by the scanner, before any override
    pub original_code: String,
    pub has_override: bool,
    /// Rules should be generated for this livery
    pub eligible: bool,
    /// Title and airline code are both present
    pub complete: bool,
}

impl Livery {
    /// Create a livery from raw scanner values.
    ///
    /// Values are cleaned, and a complete livery starts out eligible.
    pub fn new(source_key: &str, base_container: &str, title: &str, icao_code: &str) -> Self {
        let title = clean_value(title);
        let icao_code = clean_value(icao_code);
        let complete = is_complete(&title, &icao_code);
        Self {
            source_key: source_key.trim().to_string(),
            base_container: base_name(base_container),
            original_code: icao_code.clone(),
            title,
            icao_code,
            has_override: false,
            eligible: complete,
            complete,
        }
    }

    /// Whether the rule engine should use this livery
    pub fn is_processable(&self) -> bool {
        self.eligible && self.complete
    }

    /// Apply the custom data entry for this livery, if there is one.
    ///
    /// A custom airline code replaces the scanned one; the process flag of the
    /// entry decides eligibility, which still requires a complete record.
    pub fn apply_custom_data(&mut self, custom: &CustomData) -> bool {
        let Some(entry) = custom.get(&self.source_key) else {
            return false;
        };
        if !entry.custom_icao.is_empty() {
            self.icao_code = entry.custom_icao.clone();
            self.has_override = true;
            self.complete = is_complete(&self.title, &self.icao_code);
        }
        self.eligible = entry.process && self.complete;
        tracing::debug!("Custom data applied for {}", self.source_key);
        true
    }

    pub(crate) fn refresh_complete(&mut self) {
        self.complete = is_complete(&self.title, &self.icao_code);
        if !self.complete {
            self.eligible = false;
        }
    }
}

fn is_complete(title: &str, icao_code: &str) -> bool {
    !title.is_empty() && !icao_code.is_empty()
}

/// Strip double quotes and surrounding whitespace from an aircraft.cfg value
pub fn clean_value(value: &str) -> String {
    QUOTES.replace_all(value, "").trim().to_string()
}

/// Extract the base container name from an aircraft.cfg `base_container` value.
///
/// The value is often a relative path like `..\Asobo_A320_NEO`; only the last
/// component is kept. Components of a single character (`.`) yield an empty name.
pub fn base_name(value: &str) -> String {
    let cleaned = clean_value(value);
    let last = cleaned
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    if last.chars().count() <= 1 {
        String::new()
    } else {
        last.to_string()
    }
}

/// One entry of the livery catalog written by the livery scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveryCatalogEntry {
    pub source_key: String,

    #[serde(default)]
    pub base_container: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub icao: String,
}

/// Build livery records from catalog entries and apply custom data overrides.
pub fn build_liveries(entries: &[LiveryCatalogEntry], custom: &CustomData) -> Vec<Livery> {
    let mut overridden = 0;
    let liveries: Vec<Livery> = entries
        .iter()
        .map(|entry| {
            let mut livery = Livery::new(
                &entry.source_key,
                &entry.base_container,
                &entry.title,
                &entry.icao,
            );
            if livery.apply_custom_data(custom) {
                overridden += 1;
            }
            livery
        })
        .collect();

    tracing::info!(
        "Built {} liveries ({} with custom data)",
        liveries.len(),
        overridden
    );
    liveries
}

//! Rule calculation engine.
//!
//! Turns livery records and the rule tables into a nested mapping
//! `airline code -> type code -> livery titles`, which the [`document`] module
//! renders into a vPilot model matching rule set.
//!
//! # Calculation
//!
//! 1. Default rules are built from `default_types` x `type_variations` and stored
//!    under the [`DEFAULT_AIRLINE`] sentinel.
//! 2. Every processable livery whose base container is configured contributes its
//!    title to each (airline alias, type code) pair it projects to.
//!
//! Titles within a bucket keep processing order and are never deduplicated.
//! Missing table entries contribute nothing; calculation never fails.
//!
//! Every call builds a fresh [`RuleSet`]; nothing carries over between runs.

pub mod document;

pub use document::{RuleDocument, generate_document};

use crate::models::{Livery, RuleTables};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::slice;

/// Airline key under which the default rules are stored
pub const DEFAULT_AIRLINE: &str = "default";

/// type code -> livery titles
pub type RuleBucket = IndexMap<String, Vec<String>>;

/// airline code -> type code -> livery titles
pub type RuleMapping = IndexMap<String, RuleBucket>;

/// How the mapping counter of a [`RuleSet`] is incremented
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CountingPolicy {
    /// One per default (base, type code) step and one per
    /// livery x alias x type code contribution
    #[default]
    PerContribution,

    /// One per (airline, type code) bucket, the first time it becomes non-empty
    PerBucket,
}

/// Result of a rule calculation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub mapping: RuleMapping,
    pub counter: usize,
    pub policy: CountingPolicy,
}

impl RuleSet {
    fn new(policy: CountingPolicy) -> Self {
        Self {
            mapping: RuleMapping::new(),
            counter: 0,
            policy,
        }
    }

    /// Append titles to a bucket and count according to the policy.
    fn add<'a, I>(&mut self, airline: &str, type_code: &str, titles: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let bucket = self
            .mapping
            .entry(airline.to_string())
            .or_default()
            .entry(type_code.to_string())
            .or_default();

        let was_empty = bucket.is_empty();
        bucket.extend(titles.into_iter().cloned());

        match self.policy {
            CountingPolicy::PerContribution => self.counter += 1,
            CountingPolicy::PerBucket if was_empty && !bucket.is_empty() => self.counter += 1,
            CountingPolicy::PerBucket => {}
        }
    }

    /// Default rules (type code -> default titles)
    pub fn defaults(&self) -> Option<&RuleBucket> {
        self.mapping.get(DEFAULT_AIRLINE)
    }

    /// Titles for an airline and type code, empty if there is no rule
    pub fn titles(&self, airline: &str, type_code: &str) -> &[String] {
        self.mapping
            .get(airline)
            .and_then(|bucket| bucket.get(type_code))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Airline codes with rules, sorted, without the default sentinel
    pub fn airline_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .mapping
            .keys()
            .map(String::as_str)
            .filter(|code| *code != DEFAULT_AIRLINE)
            .collect();
        codes.sort_unstable();
        codes
    }

    /// Number of (airline, type code) buckets holding at least one title
    pub fn non_empty_buckets(&self) -> usize {
        self.mapping
            .values()
            .flat_map(|bucket| bucket.values())
            .filter(|titles| !titles.is_empty())
            .count()
    }
}

/// Resolve an airline code to its equivalence class.
///
/// Returns the full value list of the first `alias_table` entry that contains
/// `code`, otherwise `[code]`. Only value lists are searched: a table key that
/// is missing from its own list does not resolve to that list.
pub fn resolve_aliases(code: &str, alias_table: &IndexMap<String, Vec<String>>) -> Vec<String> {
    if code.is_empty() {
        return vec![String::new()];
    }
    alias_table
        .values()
        .find(|aliases| aliases.iter().any(|alias| alias == code))
        .cloned()
        .unwrap_or_else(|| vec![code.to_string()])
}

/// Build the default rules under the [`DEFAULT_AIRLINE`] sentinel.
///
/// Every type code of a configured base container receives all default titles
/// of that base. Base containers without type variations contribute nothing.
pub fn build_default_rules(tables: &RuleTables, policy: CountingPolicy) -> RuleSet {
    let mut rules = RuleSet::new(policy);
    rules.mapping.insert(DEFAULT_AIRLINE.to_string(), RuleBucket::new());

    for (base_container, titles) in &tables.default_types {
        for type_code in tables.type_codes(base_container) {
            rules.add(DEFAULT_AIRLINE, type_code, titles);
        }
    }
    rules
}

/// The (airline code, type code) pairs a livery contributes to.
///
/// Empty for liveries that are not processable or whose base container is not
/// part of the default types. The [`DEFAULT_AIRLINE`] key is reserved for the
/// default rules, so an airline code or alias equal to it is dropped.
pub fn project_livery(livery: &Livery, tables: &RuleTables) -> Vec<(String, String)> {
    if !livery.is_processable() || !tables.has_base(&livery.base_container) {
        return Vec::new();
    }
    let type_codes = tables.type_codes(&livery.base_container);
    resolve_aliases(&livery.icao_code, &tables.icao_variations)
        .into_iter()
        .filter(|airline| {
            if airline == DEFAULT_AIRLINE {
                tracing::warn!(
                    "Livery {} uses reserved airline code '{}', ignored",
                    livery.source_key,
                    airline
                );
                return false;
            }
            true
        })
        .flat_map(|airline| {
            type_codes
                .iter()
                .map(move |type_code| (airline.clone(), type_code.clone()))
        })
        .collect()
}

/// Calculate the complete rule set from scratch.
pub fn calculate_rules(liveries: &[Livery], tables: &RuleTables, policy: CountingPolicy) -> RuleSet {
    let mut rules = build_default_rules(tables, policy);
    let default_count = rules.counter;

    let mut used = 0;
    for livery in liveries {
        let pairs = project_livery(livery, tables);
        if pairs.is_empty() {
            continue;
        }
        used += 1;
        for (airline, type_code) in pairs {
            rules.add(&airline, &type_code, slice::from_ref(&livery.title));
        }
    }

    tracing::debug!(
        "Calculated rules: {} of {} liveries used, {} airlines, {} mappings ({} default)",
        used,
        liveries.len(),
        rules.airline_codes().len(),
        rules.counter,
        default_count
    );
    rules
}

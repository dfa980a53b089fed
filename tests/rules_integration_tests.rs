//! Integration tests for rule calculation and document generation
//!
//! These tests verify:
//! - The documented rule scenarios (defaults only, alias canonicalization, unconfigured bases)
//! - Deterministic output across recalculations
//! - That ineligible liveries have no effect on the result
//! - Alias resolution and serializer omission properties

use indexmap::IndexMap;
use matchmaker::rules::{
    CountingPolicy, DEFAULT_AIRLINE, RuleMapping, calculate_rules, generate_document,
    resolve_aliases,
};
use matchmaker::{Livery, RuleTables};
use proptest::prelude::*;

fn table(rows: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
    rows.iter()
        .map(|(key, values)| {
            (
                key.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

fn a320_tables() -> RuleTables {
    RuleTables {
        default_types: table(&[("Asobo_A320", &["Generic A320"])]),
        type_variations: table(&[("Asobo_A320", &["A320", "A321"])]),
        icao_variations: IndexMap::new(),
    }
}

#[test]
fn test_defaults_only_scenario() {
    let tables = a320_tables();
    let rules = calculate_rules(&[], &tables, CountingPolicy::PerContribution);

    let defaults = rules.defaults().unwrap();
    assert_eq!(defaults["A320"], vec!["Generic A320"]);
    assert_eq!(defaults["A321"], vec!["Generic A320"]);
    assert_eq!(rules.counter, 2);

    let doc = generate_document(&rules.mapping, &tables);
    assert_eq!(doc.default_rule_lines, 2);
    assert_eq!(doc.rule_lines, 0);
    assert_eq!(doc.text.matches("<ModelMatchRule TypeCode=").count(), 2);
    assert!(!doc.text.contains("CallsignPrefix"));
}

#[test]
fn test_defaults_only_scenario_per_bucket() {
    let rules = calculate_rules(&[], &a320_tables(), CountingPolicy::PerBucket);
    assert_eq!(rules.counter, 2);
}

#[test]
fn test_alias_canonicalization_scenario() {
    let mut tables = a320_tables();
    tables.icao_variations = table(&[("Lufthansa", &["DLH", "CLH"])]);
    let liveries = vec![
        Livery::new("dlh", "Asobo_A320", "Lufthansa A320", "DLH"),
        Livery::new("clh", "Asobo_A320", "Lufthansa CityLine A320", "CLH"),
    ];

    let rules = calculate_rules(&liveries, &tables, CountingPolicy::PerContribution);

    // Both liveries land in every code of the equivalence class
    for code in ["DLH", "CLH"] {
        assert_eq!(
            rules.titles(code, "A320"),
            ["Lufthansa A320", "Lufthansa CityLine A320"]
        );
    }
    // The table key is a name, not a callsign prefix
    assert!(rules.titles("Lufthansa", "A320").is_empty());
    assert_eq!(rules.airline_codes(), vec!["CLH", "DLH"]);
}

#[test]
fn test_unconfigured_base_is_excluded() {
    let tables = a320_tables();
    let livery = Livery::new("b747", "Asobo_B747_8i", "Lufthansa 747", "DLH");
    assert!(livery.is_processable());

    let rules = calculate_rules(&[livery], &tables, CountingPolicy::PerContribution);
    assert!(rules.airline_codes().is_empty());
    assert_eq!(rules.counter, 2);
}

#[test]
fn test_base_with_defaults_but_no_variations() {
    let mut tables = a320_tables();
    tables
        .default_types
        .insert("Asobo_CJ4".into(), vec!["CJ4 Asobo".into()]);
    let livery = Livery::new("cj4", "Asobo_CJ4", "CJ4 NetJets", "EJA");

    let rules = calculate_rules(&[livery], &tables, CountingPolicy::PerContribution);
    assert!(rules.titles("EJA", "C25C").is_empty());
    assert_eq!(rules.counter, 2);
}

#[test]
fn test_round_trip_single_rule() {
    let tables = RuleTables {
        default_types: table(&[("Asobo_A320", &[])]),
        type_variations: table(&[("Asobo_A320", &["A320"])]),
        icao_variations: IndexMap::new(),
    };
    let mut mapping = RuleMapping::new();
    mapping
        .entry("DLH".to_string())
        .or_default()
        .insert("A320".to_string(), vec!["Lufthansa A320".to_string()]);

    let doc = generate_document(&mapping, &tables);
    let rules: Vec<&str> = doc
        .text
        .lines()
        .filter(|line| line.starts_with("<ModelMatchRule "))
        .collect();
    assert_eq!(
        rules,
        vec![r#"<ModelMatchRule CallsignPrefix="DLH" TypeCode="A320" ModelName="Lufthansa A320" />"#]
    );
}

#[test]
fn test_full_document_layout() {
    let mut tables = a320_tables();
    tables.icao_variations = table(&[("Lufthansa", &["DLH", "CLH"])]);
    let liveries = vec![Livery::new("dlh", "Asobo_A320", "Lufthansa A320", "DLH")];

    let rules = calculate_rules(&liveries, &tables, CountingPolicy::PerContribution);
    let doc = generate_document(&rules.mapping, &tables);

    let expected = [
        r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        "",
        "<ModelMatchRuleSet>",
        "",
        "<!-- DEFAULTS -->",
        "<!-- BASE: Asobo_A320 -->",
        r#"<ModelMatchRule TypeCode="A320" ModelName="Generic A320" />"#,
        r#"<ModelMatchRule TypeCode="A321" ModelName="Generic A320" />"#,
        "",
        "<!-- PER ICAO RULES -->",
        "<!-- ICAO: CLH -->",
        "<!-- BASE: Asobo_A320 -->",
        r#"<ModelMatchRule CallsignPrefix="CLH" TypeCode="A320" ModelName="Lufthansa A320" />"#,
        r#"<ModelMatchRule CallsignPrefix="CLH" TypeCode="A321" ModelName="Lufthansa A320" />"#,
        "",
        "<!-- ICAO: DLH -->",
        "<!-- BASE: Asobo_A320 -->",
        r#"<ModelMatchRule CallsignPrefix="DLH" TypeCode="A320" ModelName="Lufthansa A320" />"#,
        r#"<ModelMatchRule CallsignPrefix="DLH" TypeCode="A321" ModelName="Lufthansa A320" />"#,
        "",
        "</ModelMatchRuleSet>",
        "",
    ]
    .join("\r\n");

    assert_eq!(doc.text, expected);
    assert_eq!(doc.rule_lines, 4);
}

// Property-based tests using proptest

const BASES: [&str; 3] = ["Asobo_A320", "Asobo_B787", "Asobo_CJ4"];
const CODES: [&str; 6] = ["DLH", "CLH", "BAW", "RYR", "EZY", ""];

fn property_tables() -> RuleTables {
    RuleTables {
        default_types: table(&[
            ("Asobo_A320", &["Generic A320"]),
            ("Asobo_B787", &["Generic 787", "Generic 787 Alt"]),
        ]),
        type_variations: table(&[
            ("Asobo_A320", &["A320", "A321", "B738"]),
            ("Asobo_B787", &["B789", "A333"]),
            ("Asobo_CJ4", &["C25C"]),
        ]),
        icao_variations: table(&[("Lufthansa", &["DLH", "CLH"]), ("EasyJet", &["EZY"])]),
    }
}

fn livery_strategy() -> impl Strategy<Value = Livery> {
    (
        0..BASES.len(),
        0..CODES.len(),
        "[A-Za-z0-9 ]{0,12}",
        any::<bool>(),
        any::<u16>(),
    )
        .prop_map(|(base, code, title, eligible, id)| {
            let mut livery = Livery::new(&format!("livery-{}", id), BASES[base], &title, CODES[code]);
            livery.eligible = eligible && livery.complete;
            livery
        })
}

proptest! {
    #[test]
    fn test_recalculation_is_deterministic(
        liveries in prop::collection::vec(livery_strategy(), 0..20)
    ) {
        let tables = property_tables();

        let first = calculate_rules(&liveries, &tables, CountingPolicy::PerContribution);
        let second = calculate_rules(&liveries, &tables, CountingPolicy::PerContribution);
        prop_assert_eq!(&first, &second);

        let first_doc = generate_document(&first.mapping, &tables);
        let second_doc = generate_document(&second.mapping, &tables);
        prop_assert_eq!(first_doc, second_doc);
    }

    #[test]
    fn test_unprocessable_liveries_have_no_effect(
        liveries in prop::collection::vec(livery_strategy(), 0..20)
    ) {
        let tables = property_tables();
        let processable: Vec<Livery> = liveries
            .iter()
            .filter(|l| l.is_processable())
            .cloned()
            .collect();

        for policy in [CountingPolicy::PerContribution, CountingPolicy::PerBucket] {
            let all = calculate_rules(&liveries, &tables, policy);
            let filtered = calculate_rules(&processable, &tables, policy);
            prop_assert_eq!(
                generate_document(&all.mapping, &tables).text,
                generate_document(&filtered.mapping, &tables).text
            );
            prop_assert_eq!(all.counter, filtered.counter);
        }
    }

    #[test]
    fn test_per_bucket_counter_matches_non_empty_buckets(
        liveries in prop::collection::vec(livery_strategy(), 0..20)
    ) {
        let rules = calculate_rules(&liveries, &property_tables(), CountingPolicy::PerBucket);
        prop_assert_eq!(rules.counter, rules.non_empty_buckets());
    }

    #[test]
    fn test_resolved_aliases_contain_code(code in "[A-Z]{2,4}") {
        let tables = property_tables();
        let aliases = resolve_aliases(&code, &tables.icao_variations);

        let class = tables
            .icao_variations
            .values()
            .find(|class| class.contains(&code));
        match class {
            Some(class) => prop_assert_eq!(&aliases, class),
            None => prop_assert_eq!(aliases, vec![code.clone()]),
        }
    }

    #[test]
    fn test_airlines_without_titles_are_omitted(
        empty_airlines in prop::collection::btree_set("[A-Z]{3}", 0..5)
    ) {
        let tables = property_tables();
        let mut mapping = RuleMapping::new();
        mapping
            .entry("ZZZZ".to_string())
            .or_default()
            .insert("A320".to_string(), vec!["Only Rule".to_string()]);
        for airline in &empty_airlines {
            mapping
                .entry(airline.clone())
                .or_default()
                .insert("A320".to_string(), Vec::new());
        }

        let doc = generate_document(&mapping, &tables);
        for airline in &empty_airlines {
            let marker = format!("<!-- ICAO: {} -->", airline);
            prop_assert!(!doc.text.contains(&marker));
        }
        prop_assert_eq!(doc.rule_lines, 1);
    }
}

#[test]
fn test_default_sentinel_never_becomes_airline_section() {
    let tables = a320_tables();
    let rules = calculate_rules(&[], &tables, CountingPolicy::PerContribution);
    let doc = generate_document(&rules.mapping, &tables);

    assert!(rules.mapping.contains_key(DEFAULT_AIRLINE));
    assert!(!doc.text.contains(&format!("<!-- ICAO: {} -->", DEFAULT_AIRLINE)));
}

#[test]
fn test_reserved_airline_code_stays_out_of_defaults_section() {
    let tables = a320_tables();
    let liveries = vec![
        Livery::new("x", "Asobo_A320", "Private Livery", "default"),
        Livery::new("dlh", "Asobo_A320", "Lufthansa A320", "DLH"),
    ];

    let rules = calculate_rules(&liveries, &tables, CountingPolicy::PerBucket);
    let doc = generate_document(&rules.mapping, &tables);

    assert!(!doc.text.contains("Private Livery"));
    assert_eq!(doc.default_rule_lines, 2);
    assert_eq!(doc.rule_lines, 2);
    assert_eq!(rules.counter, 4);
}

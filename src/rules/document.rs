//! Rendering of a rule mapping into a vPilot model matching rule set (`.vmr`).
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//!
//! <ModelMatchRuleSet>
//!
//! <!-- DEFAULTS -->
//! <!-- BASE: Asobo_A320_NEO -->
//! <ModelMatchRule TypeCode="A320" ModelName="Airbus A320 Neo Asobo" />
//!
//! <!-- PER ICAO RULES -->
//! <!-- ICAO: DLH -->
//! <!-- BASE: Asobo_A320_NEO -->
//! <ModelMatchRule CallsignPrefix="DLH" TypeCode="A320" ModelName="A320 Lufthansa//A320 Lufthansa Retro" />
//!
//! </ModelMatchRuleSet>
//! ```
//!
//! Airline sections and base containers are sorted; type codes follow the
//! configured `type_variations` order. vPilot picks one of several `//` joined
//! model names at random.

use super::{DEFAULT_AIRLINE, RuleBucket, RuleMapping};
use crate::models::RuleTables;
use std::borrow::Cow;
use std::collections::HashSet;

pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// vPilot is a Windows application
const LINE_END: &str = "\r\n";

/// Separator between alternative model names of one rule
pub const MODEL_SEPARATOR: &str = "//";

/// A rendered rule set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDocument {
    pub text: String,
    /// Rule elements in the airline sections
    pub rule_lines: usize,
    /// Rule elements in the defaults section
    pub default_rule_lines: usize,
}

/// Render the rule mapping.
///
/// Only buckets with at least one title become rule elements; an airline
/// without any such bucket gets no section at all.
pub fn generate_document(mapping: &RuleMapping, tables: &RuleTables) -> RuleDocument {
    let mut bases: Vec<&str> = tables.default_types.keys().map(String::as_str).collect();
    bases.sort_unstable();

    let mut out = String::with_capacity(100_000);
    push_line(&mut out, XML_HEADER);
    push_line(&mut out, "");
    push_line(&mut out, "<ModelMatchRuleSet>");
    push_line(&mut out, "");

    push_line(&mut out, "<!-- DEFAULTS -->");
    let mut default_rule_lines = 0;
    if let Some(defaults) = mapping.get(DEFAULT_AIRLINE) {
        let (section, count) = render_section(None, defaults, &bases, tables);
        out.push_str(&section);
        default_rule_lines = count;
    }
    push_line(&mut out, "");

    push_line(&mut out, "<!-- PER ICAO RULES -->");
    let mut airlines: Vec<&str> = mapping
        .keys()
        .map(String::as_str)
        .filter(|airline| *airline != DEFAULT_AIRLINE)
        .collect();
    airlines.sort_unstable();

    let mut rule_lines = 0;
    for airline in airlines {
        let (section, count) = render_section(Some(airline), &mapping[airline], &bases, tables);
        if count == 0 {
            continue;
        }
        push_line(&mut out, &format!("<!-- ICAO: {} -->", airline));
        out.push_str(&section);
        push_line(&mut out, "");
        rule_lines += count;
    }

    push_line(&mut out, "</ModelMatchRuleSet>");

    tracing::debug!(
        "Generated rule document: {} default rules, {} airline rules, {} bytes",
        default_rule_lines,
        rule_lines,
        out.len()
    );

    RuleDocument {
        text: out,
        rule_lines,
        default_rule_lines,
    }
}

fn render_section(
    airline: Option<&str>,
    bucket: &RuleBucket,
    bases: &[&str],
    tables: &RuleTables,
) -> (String, usize) {
    let mut section = String::new();
    let mut emitted: HashSet<&str> = HashSet::new();

    for base in bases {
        let mut base_rules = String::new();
        for type_code in tables.type_codes(base) {
            let Some(titles) = bucket.get(type_code).filter(|titles| !titles.is_empty()) else {
                continue;
            };
            // a type code shared by several bases is written once
            if !emitted.insert(type_code.as_str()) {
                continue;
            }
            push_line(&mut base_rules, &rule_element(airline, type_code, titles));
        }
        if !base_rules.is_empty() {
            push_line(&mut section, &format!("<!-- BASE: {} -->", base));
            section.push_str(&base_rules);
        }
    }
    (section, emitted.len())
}

fn rule_element(airline: Option<&str>, type_code: &str, titles: &[String]) -> String {
    let model_name = titles.join(MODEL_SEPARATOR);
    match airline {
        Some(airline) => format!(
            r#"<ModelMatchRule CallsignPrefix="{}" TypeCode="{}" ModelName="{}" />"#,
            escape_attr(airline),
            escape_attr(type_code),
            escape_attr(&model_name)
        ),
        None => format!(
            r#"<ModelMatchRule TypeCode="{}" ModelName="{}" />"#,
            escape_attr(type_code),
            escape_attr(&model_name)
        ),
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str(LINE_END);
}

/// Escape a value for use inside a double-quoted XML attribute
fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

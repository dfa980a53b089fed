use crate::rules::CountingPolicy;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A configuration table: key -> ordered list of values.
pub type ConfigTable = IndexMap<String, Vec<String>>;

/// Main configuration from MatchMaker.yaml
///
/// Contains file paths, the three rule tables and the custom-data overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMakerConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(flatten)]
    pub tables: RuleTables,

    #[serde(default)]
    pub counting_policy: CountingPolicy,

    #[serde(default)]
    pub custom_data: CustomData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Livery catalog written by the livery scanner
    #[serde(default = "default_livery_catalog")]
    pub livery_catalog: Utf8PathBuf,

    /// Target of the generated rule file
    #[serde(default = "default_output_file")]
    pub output_file: Utf8PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            livery_catalog: default_livery_catalog(),
            output_file: default_output_file(),
        }
    }
}

fn default_livery_catalog() -> Utf8PathBuf {
    Utf8PathBuf::from("liveries.yaml")
}

fn default_output_file() -> Utf8PathBuf {
    Utf8PathBuf::from("MatchMakingRulesUI.vmr")
}

/// The three tables driving rule generation.
///
/// On disk each value may be a YAML sequence or a comma-separated string;
/// items are trimmed and empty items dropped. Order within a list is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTables {
    /// base container -> default livery titles
    #[serde(default, deserialize_with = "deserialize_table")]
    pub default_types: ConfigTable,

    /// base container -> aircraft type codes sharing that base
    #[serde(default, deserialize_with = "deserialize_table")]
    pub type_variations: ConfigTable,

    /// canonical airline name -> equivalent airline codes
    #[serde(default, deserialize_with = "deserialize_table")]
    pub icao_variations: ConfigTable,
}

impl RuleTables {
    /// Check if a base container is configured in the default types
    pub fn has_base(&self, base_container: &str) -> bool {
        self.default_types.contains_key(base_container)
    }

    /// Type codes configured for a base container, empty if none
    pub fn type_codes(&self, base_container: &str) -> &[String] {
        self.type_variations
            .get(base_container)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Add or replace the default livery titles for a base container.
    ///
    /// Returns true if the table changed.
    pub fn add_default_type(&mut self, base_container: &str, titles: Vec<String>) -> bool {
        let titles = clean_items(titles);
        if self.default_types.get(base_container) == Some(&titles) {
            return false;
        }
        self.default_types.insert(base_container.to_string(), titles);
        true
    }

    /// Remove a base container from the default types.
    ///
    /// Order of the remaining entries is kept.
    pub fn remove_default_type(&mut self, base_container: &str) -> Option<Vec<String>> {
        self.default_types.shift_remove(base_container)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableValue {
    List(Vec<String>),
    Csv(String),
}

impl TableValue {
    fn into_items(self) -> Vec<String> {
        match self {
            TableValue::List(items) => clean_items(items),
            TableValue::Csv(line) => clean_items(line.split(',').map(str::to_string)),
        }
    }
}

fn clean_items<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn deserialize_table<'de, D>(deserializer: D) -> Result<ConfigTable, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: IndexMap<String, Option<TableValue>> = IndexMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let items = value.map(TableValue::into_items).unwrap_or_default();
            (key.trim().to_string(), items)
        })
        .collect())
}

/// Custom data for one livery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEntry {
    #[serde(default)]
    pub process: bool,

    #[serde(default)]
    pub original_icao: String,

    #[serde(default)]
    pub custom_icao: String,
}

/// Overrides keyed by the livery source key.
///
/// Kept sorted so the saved configuration is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomData {
    entries: BTreeMap<String, CustomEntry>,
}

impl CustomData {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, source_key: &str) -> bool {
        self.entries.contains_key(source_key)
    }

    pub fn get(&self, source_key: &str) -> Option<&CustomEntry> {
        self.entries.get(source_key)
    }

    pub fn get_mut(&mut self, source_key: &str) -> Option<&mut CustomEntry> {
        self.entries.get_mut(source_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CustomEntry)> {
        self.entries.iter()
    }

    /// Add a new entry or overwrite an existing one completely.
    ///
    /// Empty source keys are ignored. Returns true if the data changed.
    pub fn add_or_change(&mut self, source_key: &str, entry: CustomEntry) -> bool {
        if source_key.is_empty() {
            return false;
        }
        if self.entries.get(source_key) == Some(&entry) {
            return false;
        }
        self.entries.insert(source_key.to_string(), entry);
        true
    }

    /// Set the process flag of an entry, creating the entry if needed.
    ///
    /// Returns true if the data changed.
    pub fn set_process_flag(&mut self, source_key: &str, process: bool, icao: &str) -> bool {
        match self.entries.get_mut(source_key) {
            Some(entry) if entry.process == process => false,
            Some(entry) => {
                entry.process = process;
                true
            }
            None => self.add_or_change(
                source_key,
                CustomEntry {
                    process,
                    original_icao: icao.to_string(),
                    custom_icao: String::new(),
                },
            ),
        }
    }

    pub fn remove(&mut self, source_key: &str) -> Option<CustomEntry> {
        self.entries.remove(source_key)
    }
}

impl Default for MatchMakerConfig {
    /// The stock configuration covering the default Asobo fleet.
    fn default() -> Self {
        fn table(rows: &[(&str, &str)]) -> ConfigTable {
            rows.iter()
                .map(|(key, csv)| {
                    let items = TableValue::Csv((*csv).to_string()).into_items();
                    ((*key).to_string(), items)
                })
                .collect()
        }

        let default_types = table(&[
            ("Asobo_A320_NEO", "Airbus A320 Neo Asobo"),
            ("Asobo_B747_8i", "Boeing 747-8i Asobo"),
            ("Asobo_B787_10", "Boeing 787-10 Asobo"),
            ("Asobo_CJ4", "Cessna CJ4 Citation Asobo"),
            ("Asobo_Longitude", "Cessna Citation Longitude Asobo"),
            (
                "Asobo_TBM930",
                "TBM 930 Asobo,TBM 930 Asobo Air Traffic 00,TBM 930 Asobo Air Traffic 01,TBM 930 Asobo Air Traffic 02",
            ),
        ]);

        let type_variations = table(&[
            // Narrow/Medium Jet 2 Engines
            (
                "Asobo_A320_NEO",
                "A19N,A20N,A21N,A318,A319,A320,A321,B732,B733,B734,B735,B736,B737,B738,B739,B73X,B37M,B38M,B39M",
            ),
            // Wide/Heavy Jet 2 Engines
            (
                "Asobo_B787_10",
                "B78X,B788,B789,B762,B763,B764,B772,B773,B778,B779,B77L,B77W,A306,A30B,A310,A332,A333,A337,A338,A339",
            ),
            // Wide/Heavy Jet 4 Engines
            ("Asobo_B747_8i", "B741,B742,B743,B744,B748,B74F,A380,A388"),
            // Business Jet 2 Tail Engines
            ("Asobo_CJ4", "C25C,C25B,C25A,C500,C501,C510,C525,C526"),
            ("Asobo_Longitude", "C700,C750"),
            // Turbo Prop
            ("Asobo_TBM930", "TBM9"),
        ]);

        let icao_variations = table(&[
            ("Lufthansa", "DLH,LHA,CLH"),
            ("BritishAirways", "BAW,BA,SHT,CFE"),
            ("EasyJet", "EZY,EJU,EZS"),
            ("TUI", "TUI,TOM,TFL,THOM"),
            ("Eurowings", "EWG,EWE"),
            ("Ryanair", "RYR,RUK"),
            ("DHL", "BCS,DHL,DAE,DHK"),
            ("Fedex", "FDX,FEDEX"),
            ("Luxair", "LUX,LGL"),
            ("WizzAir", "WZZ,WUK"),
            ("VirginAtlantic", "VIR,VOZ"),
        ]);

        Self {
            paths: PathsConfig::default(),
            tables: RuleTables {
                default_types,
                type_variations,
                icao_variations,
            },
            counting_policy: CountingPolicy::default(),
            custom_data: CustomData::default(),
        }
    }
}

//! MatchMaker - create model matching rules for VATSIM vPilot
//!
//! Command line entry point.
//!
//! # Execution Flow
//!
//! 1. Initialize logging → logs/matchmaker.<date>
//! 2. Load `MatchMaker.yaml` from the config directory (stock configuration if missing)
//! 3. Load the livery catalog and apply custom data overrides
//! 4. Calculate the rules and render the rule document
//! 5. Save the document (previous file kept as `.bak`) unless `--print` only is requested
//! 6. Log the session metrics

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use matchmaker::{APP_NAME, ConfigManager, CountingPolicy, StateManager, VERSION};

/// Create vPilot model matching rules from flight simulator liveries
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing MatchMaker.yaml
    #[arg(long, value_name = "DIR", default_value = ".")]
    config_dir: Utf8PathBuf,

    /// Livery catalog (defaults to paths.livery_catalog of the config)
    #[arg(long, value_name = "FILE")]
    liveries: Option<Utf8PathBuf>,

    /// Rule file to write (defaults to paths.output_file of the config)
    #[arg(long, value_name = "FILE")]
    output: Option<Utf8PathBuf>,

    /// How generated mappings are counted
    #[arg(long, value_enum)]
    counting_policy: Option<CountingPolicy>,

    /// Print the rule document to stdout instead of saving it
    #[arg(long)]
    print: bool,

    /// Write the stock configuration if no MatchMaker.yaml exists
    #[arg(long)]
    init_config: bool,

    /// Directory for log files
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: Utf8PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = matchmaker::logging::setup_logging_with_console(&cli.log_dir, APP_NAME, cli.debug, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let config = config_manager.load_config()?;

    if cli.init_config && !config_manager.config_path().exists() {
        config_manager.save_config(&config)?;
        tracing::info!("Wrote stock configuration to {}", config_manager.config_path());
    }

    let state_manager = StateManager::with_config(&config);
    if let Some(policy) = cli.counting_policy {
        state_manager.set_counting_policy(policy);
    }

    let catalog = cli
        .liveries
        .clone()
        .unwrap_or_else(|| config_manager.resolve(&config.paths.livery_catalog));
    let liveries = config_manager
        .load_liveries(&catalog, &config.custom_data)
        .with_context(|| format!("Could not load liveries from {}", catalog))?;
    state_manager.set_liveries(liveries);

    let (found, queued) = state_manager.read(|s| (s.found_count(), s.queued_count()));
    tracing::info!("Number of liveries found: {}, queued: {}", found, queued);

    state_manager.recalculate();

    let (mappings, rule_lines, text) = state_manager.read(|s| {
        let document = s.document.clone().unwrap_or_default();
        (s.rules.counter, document.rule_lines, document.text)
    });
    tracing::info!("Generated {} mappings, {} rule lines", mappings, rule_lines);

    if cli.print {
        print!("{}", text);
    } else {
        let output = cli
            .output
            .unwrap_or_else(|| config_manager.resolve(&config.paths.output_file));
        state_manager.save_rules(&output)?;
        tracing::info!("Rules saved to file: {}", output);
    }

    state_manager.metrics().log_summary();
    Ok(())
}

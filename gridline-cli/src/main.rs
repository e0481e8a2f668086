//! Gridline CLI — plan and run energy-market data retrieval.
//!
//! Commands:
//! - `run` — execute the full retrieval plan and export CSV tables
//! - `plan` — print the (query, period) request plan without fetching

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use gridline_core::{
    DatasetCoordinator, FetchExecutor, MockMarketClient, QueryRegistry, StdoutReporter,
};
use std::path::{Path, PathBuf};

mod export;
mod schedule;
mod settings;

use schedule::build_request_plan;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "gridline",
    about = "Gridline — energy-market time-series retrieval and export"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the retrieval plan and export CSV tables.
    Run {
        /// Path to the settings file.
        #[arg(long, default_value = "settings.toml")]
        settings: PathBuf,

        /// Output directory override (defaults to the settings value).
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Seed for the bundled deterministic provider.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Print the request plan without fetching anything.
    Plan {
        /// Path to the settings file.
        #[arg(long, default_value = "settings.toml")]
        settings: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            settings,
            output_dir,
            seed,
        } => run_cmd(&settings, output_dir, seed),
        Commands::Plan { settings } => plan_cmd(&settings),
    }
}

fn run_cmd(settings_path: &Path, output_dir: Option<PathBuf>, seed: u64) -> Result<()> {
    let settings = Settings::from_file(settings_path)?;
    let now = Utc::now().with_timezone(&settings.zone.tz());

    let plan = build_request_plan(&settings, now);
    for note in &plan.notes {
        println!("{note}");
    }

    // TODO: swap in a real provider transport once an ENTSO-E REST client
    // is chosen; the pipeline only depends on the MarketDataClient trait.
    let client = MockMarketClient::new(seed).with_api_token(&settings.api_token);
    let registry = QueryRegistry::standard(settings.zone);
    let reporter = StdoutReporter;
    let executor = FetchExecutor::new(&client, &reporter);
    let coordinator = DatasetCoordinator::new(&registry, executor, now);

    let dataset = coordinator.run(&plan.requests)?;

    let out_dir = output_dir.unwrap_or_else(|| settings.output_dir.clone());
    let paths = export::export_dataset(&dataset, &out_dir)?;
    for path in &paths {
        println!("Exported {}", path.display());
    }

    let years = export::historical_year_tables(&dataset);
    if years.len() > 1 {
        let stacked = out_dir.join("historical_stacked.csv");
        export::write_stacked_csv(&years, &stacked)?;
        println!("Exported {}", stacked.display());
    }

    if !dataset.is_empty() {
        let workbook = out_dir.join("dataset.xlsx");
        export::write_multisheet_xlsx(&dataset, &workbook)?;
        println!("Exported {}", workbook.display());
    }

    for warning in dataset.warnings() {
        println!("WARNING: {warning}");
    }
    println!(
        "done: {} of {} requested tables exported",
        dataset.len(),
        plan.requests.len()
    );
    Ok(())
}

fn plan_cmd(settings_path: &Path) -> Result<()> {
    let settings = Settings::from_file(settings_path)?;
    let now = Utc::now().with_timezone(&settings.zone.tz());

    let plan = build_request_plan(&settings, now);
    for note in &plan.notes {
        println!("{note}");
    }
    println!("Zone: {} ({})", settings.zone, settings.zone.tz());
    for (name, period) in &plan.requests {
        println!("  {name} x {period}");
    }
    Ok(())
}

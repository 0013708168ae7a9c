//! Cost Projection CLI
//!
//! Runs one simulation from command-line inputs and prints the report

use anyhow::Context;
use clap::Parser;
use cost_projection::simulation::format_currency;
use cost_projection::{
    DoctrineConstants, HistoryPolicy, JsonFileStore, NumericField, ResultStore, ScenarioRunner,
    SimulationInputs,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "cost_projection",
    version,
    about = "Monte Carlo cost projection for discount programs"
)]
struct Cli {
    /// Current annualized cost
    #[arg(long, default_value = "100000")]
    current_cost: String,

    /// Renewal increases in percent, most recent first (up to 3)
    #[arg(long = "renewal", num_args = 1..=3, default_values = ["5", "7", "6"])]
    renewals: Vec<String>,

    /// Actual past-year costs, most recent first (up to 3)
    #[arg(long = "historical-cost", num_args = 1..=3)]
    historical_costs: Vec<String>,

    /// Derive historical costs from the renewal history
    #[arg(long, conflicts_with = "historical_costs")]
    derive_history: bool,

    #[arg(long, default_value = "1000")]
    iterations: String,

    /// Explicit volatility fraction (skips estimation)
    #[arg(long)]
    volatility: Option<String>,

    #[arg(long)]
    no_self_insured: bool,
    #[arg(long)]
    no_reference_based: bool,
    #[arg(long)]
    no_map: bool,

    /// 1 in N simulated years is a bad year
    #[arg(long, default_value = "5")]
    bad_year_frequency: String,
    /// Bad-year spike bounds in percent
    #[arg(long, default_value = "30")]
    bad_year_min: String,
    #[arg(long, default_value = "40")]
    bad_year_max: String,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Constants table CSV overriding the doctrine discounts
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Print the full result as JSON instead of the report
    #[arg(long)]
    json: bool,

    /// Directory of the result store to save into
    #[arg(long, requires = "key")]
    save: Option<PathBuf>,

    /// Scenario key (company or session id) for --save
    #[arg(long)]
    key: Option<String>,
}

fn field(s: &str) -> Option<NumericField> {
    Some(NumericField::from(s))
}

fn nth(values: &[String], i: usize) -> Option<NumericField> {
    values.get(i).and_then(|s| field(s))
}

impl Cli {
    fn to_inputs(&self) -> SimulationInputs {
        SimulationInputs {
            renewal1: nth(&self.renewals, 0),
            renewal2: nth(&self.renewals, 1),
            renewal3: nth(&self.renewals, 2),
            current_cost: field(&self.current_cost),
            iterations: field(&self.iterations),
            volatility_override: self.volatility.as_deref().and_then(field),
            historical_cost1: nth(&self.historical_costs, 0),
            historical_cost2: nth(&self.historical_costs, 1),
            historical_cost3: nth(&self.historical_costs, 2),
            use_self_insured: !self.no_self_insured,
            use_reference_based: !self.no_reference_based,
            use_map: !self.no_map,
            bad_year_frequency: field(&self.bad_year_frequency),
            bad_year_increase_min: field(&self.bad_year_min),
            bad_year_increase_max: field(&self.bad_year_max),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let constants = match &cli.constants {
        Some(path) => DoctrineConstants::from_csv_path(path)
            .with_context(|| format!("loading constants from {}", path.display()))?,
        None => DoctrineConstants::doctrine(),
    };
    let runner = ScenarioRunner::with_constants(constants);

    let mut inputs = cli.to_inputs();
    if cli.derive_history {
        inputs.apply_derived_history(HistoryPolicy::Locked);
    }

    let result = match cli.seed {
        Some(seed) => runner.run_seeded(&inputs, seed),
        None => runner.run(&inputs),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Cost Projection v{}", env!("CARGO_PKG_VERSION"));
        println!("========================\n");
        println!(
            "Iterations: {}   Volatility: {:.4}%",
            result.iterations,
            result.volatility * 100.0
        );
        println!();
        println!("{:<16} {:>16} {:>16} {:>16}", "Scenario", "Mean", "P5", "P95");
        println!("{}", "-".repeat(67));
        for (name, stats) in result.scenarios() {
            println!(
                "{:<16} {:>16} {:>16} {:>16}",
                name,
                format_currency(stats.mean),
                format_currency(stats.p5),
                format_currency(stats.p95)
            );
        }

        if !result.historical.is_empty() {
            println!("\nHistorical what-if:");
            for (i, year) in result.historical.iter().enumerate() {
                println!(
                    "  Year -{}: actual {} -> with programs {} (saved {})",
                    i + 1,
                    format_currency(year.year_cost),
                    format_currency(year.map_if_in_place),
                    format_currency(year.savings())
                );
            }
        }

        println!("\n{}", result.narrative);
    }

    if let (Some(dir), Some(key)) = (&cli.save, &cli.key) {
        let mut store = JsonFileStore::open(dir)
            .with_context(|| format!("opening result store {}", dir.display()))?;
        store
            .save(key, &result)
            .with_context(|| format!("saving result under {:?}", key))?;
        eprintln!("Saved result as {:?} in {}", key, dir.display());
    }

    Ok(())
}

//! Run simulations for a list of prospects from CSV
//!
//! Usage: cargo run --bin run_batch -- prospects.csv [--output batch_output.csv] [--save results/]
//!
//! Input columns (all optional except company_id):
//! company_id,current_cost,renewal1,renewal2,renewal3,historical_cost1,historical_cost2,
//! historical_cost3,iterations,volatility,use_self_insured,use_reference_based,use_map,
//! bad_year_frequency,bad_year_increase_min,bad_year_increase_max

use anyhow::Context;
use clap::Parser;
use cost_projection::simulation::format_currency;
use cost_projection::{
    DoctrineConstants, JsonFileStore, NumericField, ResultStore, ScenarioRunner, SimulationInputs,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(about = "Batch cost projections for many prospects")]
struct Args {
    /// Prospects CSV
    input: PathBuf,

    /// Summary CSV to write
    #[arg(long, default_value = "batch_output.csv")]
    output: PathBuf,

    /// Constants table CSV overriding the doctrine discounts
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Seed for the first prospect; prospect i uses seed + i
    #[arg(long, default_value_t = 2024)]
    seed: u64,

    /// Also store each full result as JSON under this directory
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Raw CSV row; every value goes through the same coercion as form input
#[derive(Debug, Deserialize)]
struct ProspectRow {
    company_id: String,
    current_cost: Option<String>,
    renewal1: Option<String>,
    renewal2: Option<String>,
    renewal3: Option<String>,
    historical_cost1: Option<String>,
    historical_cost2: Option<String>,
    historical_cost3: Option<String>,
    iterations: Option<String>,
    volatility: Option<String>,
    use_self_insured: Option<String>,
    use_reference_based: Option<String>,
    use_map: Option<String>,
    bad_year_frequency: Option<String>,
    bad_year_increase_min: Option<String>,
    bad_year_increase_max: Option<String>,
}

fn numeric(value: &Option<String>) -> Option<NumericField> {
    value.as_deref().map(NumericField::from)
}

/// Missing toggles default to on, matching the workbench
fn flag(value: &Option<String>) -> bool {
    match value.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "y"),
    }
}

impl ProspectRow {
    fn to_inputs(&self) -> SimulationInputs {
        SimulationInputs {
            renewal1: numeric(&self.renewal1),
            renewal2: numeric(&self.renewal2),
            renewal3: numeric(&self.renewal3),
            current_cost: numeric(&self.current_cost),
            iterations: numeric(&self.iterations),
            volatility_override: numeric(&self.volatility),
            historical_cost1: numeric(&self.historical_cost1),
            historical_cost2: numeric(&self.historical_cost2),
            historical_cost3: numeric(&self.historical_cost3),
            use_self_insured: flag(&self.use_self_insured),
            use_reference_based: flag(&self.use_reference_based),
            use_map: flag(&self.use_map),
            bad_year_frequency: numeric(&self.bad_year_frequency),
            bad_year_increase_min: numeric(&self.bad_year_increase_min),
            bad_year_increase_max: numeric(&self.bad_year_increase_max),
        }
    }
}

/// One summary line per prospect
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    company_id: &'a str,
    iterations: usize,
    volatility: f64,
    baseline_mean: f64,
    baseline_p5: f64,
    baseline_p95: f64,
    self_insured_mean: f64,
    reference_based_mean: f64,
    map_drug_mean: f64,
    expected_savings: f64,
    historical_savings: f64,
    projection_baseline: f64,
    projection_map_drug: f64,
    bad_years: usize,
    bad_year_extra_cost: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading prospects from {}...", args.input.display());

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let rows: Vec<ProspectRow> = reader
        .deserialize()
        .collect::<Result<_, _>>()
        .context("reading prospect rows")?;
    println!("Loaded {} prospects in {:?}", rows.len(), start.elapsed());

    let constants = match &args.constants {
        Some(path) => DoctrineConstants::from_csv_path(path)?,
        None => DoctrineConstants::doctrine(),
    };
    let runner = ScenarioRunner::with_constants(constants);

    println!("Running simulations...");
    let sim_start = Instant::now();
    let inputs: Vec<SimulationInputs> = rows.iter().map(ProspectRow::to_inputs).collect();
    let results = runner.run_batch(&inputs, args.seed);
    println!("Simulations complete in {:?}", sim_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for (row, result) in rows.iter().zip(&results) {
        writer.serialize(SummaryRow {
            company_id: &row.company_id,
            iterations: result.iterations,
            volatility: result.volatility,
            baseline_mean: result.baseline.mean,
            baseline_p5: result.baseline.p5,
            baseline_p95: result.baseline.p95,
            self_insured_mean: result.self_insured.mean,
            reference_based_mean: result.reference_based.mean,
            map_drug_mean: result.map_drug.mean,
            expected_savings: result.expected_savings(),
            historical_savings: result.total_historical_savings_if_in_place,
            projection_baseline: result.projection.baseline,
            projection_map_drug: result.projection.map_drug,
            bad_years: result.bad_year_stats.count,
            bad_year_extra_cost: result.bad_year_stats.total_extra_cost,
        })?;
    }
    writer.flush()?;
    println!("Output written to {}", args.output.display());

    if let Some(dir) = &args.save {
        let mut store = JsonFileStore::open(dir)?;
        let mut failed = 0;
        for (row, result) in rows.iter().zip(&results) {
            // A failed save only loses that prospect's stored copy
            if let Err(e) = store.save(&row.company_id, result) {
                log::error!("save failed for {}: {}", row.company_id, e);
                failed += 1;
            }
        }
        println!("Saved {} results to {}", results.len() - failed, dir.display());
    }

    let total_savings: f64 = results.iter().map(|r| r.expected_savings()).sum();
    println!("\nBatch Summary:");
    println!("  Prospects:              {}", results.len());
    println!("  Total expected savings: {}", format_currency(total_savings));
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}

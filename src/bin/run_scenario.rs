//! Run one payout scenario from CSV market data and a mortality table
//!
//! Prints a per-level summary and writes the full report as JSON.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use ul_guarantee::market::load_price_series;
use ul_guarantee::mortality::load_mortality_table;
use ul_guarantee::{InstrumentId, PriceSeries, ScenarioConfig, ScenarioReport, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(
    name = "run_scenario",
    version,
    about = "Monte Carlo payouts of a unit-linked policy with a capital guarantee"
)]
struct Cli {
    /// Scenario configuration (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Price history as TICKER=PATH; repeat for several funds
    #[arg(short, long = "prices", value_parser = parse_price_source, required = true)]
    prices: Vec<(InstrumentId, PathBuf)>,

    /// Mortality table CSV (age, qx)
    #[arg(short, long)]
    mortality: PathBuf,

    /// Override the number of simulated paths
    #[arg(long)]
    paths: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the guarantee levels, e.g. --guarantee 0.8 --guarantee 1.0
    #[arg(long = "guarantee")]
    guarantees: Vec<f64>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write floored payouts per path and level as CSV
    #[arg(long)]
    payouts_csv: Option<PathBuf>,
}

fn parse_price_source(raw: &str) -> std::result::Result<(InstrumentId, PathBuf), String> {
    let (ticker, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TICKER=PATH, got '{raw}'"))?;
    let instrument = InstrumentId::new(ticker).map_err(|e| e.to_string())?;
    Ok((instrument, PathBuf::from(path)))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let start = Instant::now();

    let mut config = match &cli.config {
        Some(path) => ScenarioConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    if let Some(paths) = cli.paths {
        config.n_paths = paths;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if !cli.guarantees.is_empty() {
        config.guarantee_levels = cli.guarantees.clone();
    }

    let series = cli
        .prices
        .iter()
        .map(|(instrument, path)| {
            load_price_series(instrument.as_str(), path)
                .with_context(|| format!("loading prices for {instrument} from {}", path.display()))
        })
        .collect::<Result<Vec<PriceSeries>>>()?;
    let table = load_mortality_table(&cli.mortality)
        .with_context(|| format!("loading mortality table {}", cli.mortality.display()))?;

    let runner = ScenarioRunner::new(config).context("invalid scenario configuration")?;
    let report = runner.run(&series, &table)?;

    print_summary(&report);

    match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
            eprintln!("Report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }

    if let Some(path) = &cli.payouts_csv {
        write_payouts(path, &report)?;
        eprintln!("Payouts written to {}", path.display());
    }

    eprintln!("Done in {:?}", start.elapsed());
    Ok(())
}

fn print_summary(report: &ScenarioReport) {
    let h = &report.horizon;
    eprintln!(
        "Horizon: age {} to {} ({} years), survival probability {:.4}",
        h.entry_age, h.death_age, h.years, h.survival_probability
    );
    eprintln!(
        "Model: {:?}, mu={:.2}%, sigma={:.2}%, mean gross value {:.2} EUR",
        report.model,
        report.weighted_mu * 100.0,
        report.weighted_sigma * 100.0,
        report.mean_gross_value
    );
    eprintln!("Level | Guaranteed | Cost %/y | Mean payout | VaR95 | CVaR95 | Floor hit");
    for o in &report.outcomes {
        eprintln!(
            "{:4.0}% | {:10.2} | {:8.4} | {:11.2} | {:9.2} | {:9.2} | {:8.1}%",
            o.level * 100.0,
            o.guaranteed_amount,
            o.cost.annual_pct,
            o.summary.mean,
            o.summary.var_95,
            o.summary.cvar_95,
            o.floor_hit_ratio * 100.0
        );
    }
    for w in report.all_warnings() {
        eprintln!("{w}");
    }
}

/// One row per path, one column per guarantee level
fn write_payouts(path: &Path, report: &ScenarioReport) -> Result<()> {
    let Some(first) = report.outcomes.first() else {
        bail!("report has no outcomes to write");
    };
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["path".to_string()];
    header.extend(report.outcomes.iter().map(|o| format!("guarantee_{:.0}", o.level * 100.0)));
    wtr.write_record(&header)?;

    for i in 0..first.payouts.len() {
        let mut record = vec![i.to_string()];
        record.extend(report.outcomes.iter().map(|o| format!("{:.2}", o.payouts[i])));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

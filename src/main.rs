//! Cashflow Projection CLI
//!
//! Runs one of the built-in scenarios and prints its period table

use anyhow::Context;
use cashflow_projection::{
    config::parse_start_date,
    projection::History,
    scenario::{Amortization, RentEscalation},
    DateIncrement, ProjectionConfig, ResultStore, Scenario, ScenarioRunner,
};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cashflow_projection", about = "Period-indexed cashflow projections", version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Write the full results to a CSV file
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Print results as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    scenario: ScenarioCommand,
}

/// Overrides for the scenario's default configuration
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Load the projection config from a JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of periods
    #[arg(short, long, global = true)]
    periods: Option<u32>,

    /// First period date (YYYY-MM-DD or D-Mon-YYYY)
    #[arg(long, global = true)]
    start_date: Option<String>,

    #[arg(long, global = true, value_enum)]
    increment: Option<DateIncrement>,

    /// chrono strftime pattern for period dates
    #[arg(long, global = true)]
    date_format: Option<String>,

    /// Locale for month names and the default long date, e.g. es_ES or es
    #[arg(long, global = true)]
    locale: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ScenarioCommand {
    /// Monthly rent indexed on cost per square meter
    Rent {
        #[arg(long, default_value_t = 1_600_000.0)]
        square_meter_value: f64,
        #[arg(long, default_value_t = 6_000.0)]
        total_meters: f64,
        #[arg(long, default_value_t = 0.005)]
        monthly_index: f64,
    },
    /// Straight-line loan amortization
    Amortization {
        #[arg(long, default_value_t = 10_000.0)]
        loan_amount: f64,
        #[arg(long, default_value_t = 0.0087)]
        monthly_rate: f64,
    },
}

impl ScenarioCommand {
    fn scenario(&self) -> Scenario {
        match *self {
            ScenarioCommand::Rent { square_meter_value, total_meters, monthly_index } => {
                Scenario::RentEscalation(RentEscalation { square_meter_value, total_meters, monthly_index })
            }
            ScenarioCommand::Amortization { loan_amount, monthly_rate } => {
                Scenario::Amortization(Amortization { loan_amount, monthly_rate })
            }
        }
    }
}

/// Merge file config, scenario defaults and flags (flags win)
fn resolve_config(args: &ConfigArgs, scenario: &Scenario) -> anyhow::Result<ProjectionConfig> {
    let mut config = match &args.config {
        Some(path) => ProjectionConfig::from_json_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => scenario.default_config(),
    };

    if let Some(periods) = args.periods {
        config.periods = periods;
    }

    let wants_dates = args.start_date.is_some()
        || args.increment.is_some()
        || args.date_format.is_some()
        || args.locale.is_some();
    if wants_dates {
        let mut dates = config.dates.take().unwrap_or_default();
        if let Some(start) = &args.start_date {
            dates.start = Some(parse_start_date(start)?);
        }
        if let Some(increment) = args.increment {
            dates.increment = increment;
        }
        if let Some(format) = &args.date_format {
            dates.format = Some(format.clone());
        }
        if let Some(locale) = &args.locale {
            dates.locale = Some(locale.clone());
        }
        config.dates = Some(dates);
    }

    Ok(config)
}

fn print_table(store: &ResultStore) {
    let visible: Vec<_> = store.visible().collect();
    let dated = !store.dates().is_empty();

    let mut header = format!("{:>6}", "Period");
    if dated {
        header.push_str(&format!(" {:>18}", "Date"));
    }
    for series in &visible {
        if series.name != "date" {
            header.push_str(&format!(" {:>24}", series.name));
        }
    }
    header.push_str(&format!(" {:>18} {:>18}", "Total", "Total Sum"));
    println!("{}", header);
    println!("{}", "-".repeat(header.len()));

    for period in 0..store.periods() as usize {
        let mut line = format!("{:>6}", period + 1);
        if dated {
            line.push_str(&format!(" {:>18}", store.dates()[period]));
        }
        for series in &visible {
            match &series.history {
                History::Raw(values) if series.name != "date" => {
                    line.push_str(&format!(" {:>24}", values[period].to_string()));
                }
                History::Raw(_) => {}
                History::Aggregated(entries) => {
                    line.push_str(&format!(" {:>24.2}", entries[period].current));
                }
            }
        }
        let total = store.total()[period];
        line.push_str(&format!(" {:>18.2} {:>18.2}", total.current, total.sum));
        println!("{}", line);
    }

    let summary = store.summary();
    println!("\nSummary:");
    println!("  Periods: {}", summary.periods);
    for var in &summary.variables {
        println!("  {}: sum {:.2}, average {:.2}", var.name, var.sum, var.average);
    }
    println!("  Total: sum {:.2}, average {:.2}", summary.total_sum, summary.total_average);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let scenario = cli.scenario.scenario();
    let config = resolve_config(&cli.config, &scenario)?;
    log::debug!("scenario {} with {:?}", scenario.name(), config);
    let store = ScenarioRunner::with_config(config)
        .run(&scenario)
        .with_context(|| format!("running scenario {}", scenario.name()))?;

    if cli.json {
        println!("{}", store.to_json()?);
    } else {
        print_table(&store);
    }

    if let Some(path) = &cli.csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        store.write_csv(file)?;
        println!("\nFull results written to: {}", path.display());
    }

    Ok(())
}

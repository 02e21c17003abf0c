//! Savings Projection CLI
//!
//! Command-line interface for running a savings projection and exporting
//! the annual ledger to CSV

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use log::info;

use savings_projection::{
    params::read_params,
    report::{chart_title, display_rows, render_table, write_csv_file, AgeLabel, ReportOptions},
    CompoundingFrequency, LimitTable, Parameters, ProjectionEngine,
};

/// Project retirement savings year by year.
///
/// Values start from the built-in defaults, are replaced by `--params` when
/// given, and are then overridden by individual flags.
#[derive(Debug, Parser)]
#[command(name = "savings_projection", version, about)]
struct Cli {
    /// JSON file with a parameter set
    #[arg(long)]
    params: Option<PathBuf>,

    /// Balance already saved at the start of the plan
    #[arg(long)]
    current_savings: Option<f64>,

    /// Annual contribution before the second schedule age
    #[arg(long)]
    init_contrib: Option<f64>,

    /// Age at the start of the plan
    #[arg(long)]
    init_age: Option<u32>,

    /// Annual contribution from the second schedule age onward
    #[arg(long)]
    second_contrib: Option<f64>,

    /// Age at which the second schedule starts
    #[arg(long)]
    second_age: Option<u32>,

    /// Use a single contribution schedule
    #[arg(long)]
    no_second: bool,

    /// Employer contribution as a fraction of the employee contribution
    #[arg(long)]
    employer_rate: Option<f64>,

    /// Nominal annual return, e.g. 0.06
    #[arg(long)]
    annual_return: Option<f64>,

    /// Compounding frequency: 4, 12, 26, quarterly, monthly or biweekly
    #[arg(long, value_parser = parse_frequency)]
    periods_per_year: Option<CompoundingFrequency>,

    /// Plan horizon
    #[arg(long)]
    retirement_age: Option<u32>,

    /// CSV limit table (year_label,elective_deferral,catch_up,catch_up_age,total_additions)
    #[arg(long, conflicts_with = "irs_limits")]
    limits: Option<PathBuf>,

    /// Clamp contributions to the built-in 2025 401(k) limits
    #[arg(long)]
    irs_limits: bool,

    /// Label rows with the age at the end of each plan year
    #[arg(long)]
    end_of_year_age: bool,

    /// Include a Year 0 row with the starting savings
    #[arg(long)]
    baseline: bool,

    /// Calendar year in which the plan starts
    #[arg(long)]
    start_year: Option<i32>,

    /// Label rows with calendar years starting this year
    #[arg(long, conflicts_with = "start_year")]
    calendar: bool,

    /// Output CSV path
    #[arg(long, default_value = "projection_output.csv")]
    output: PathBuf,

    /// Skip printing the table
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn parameters(&self) -> Result<Parameters> {
        let mut params = match &self.params {
            Some(path) => read_params(path)
                .with_context(|| format!("loading parameters from {}", path.display()))?,
            None => Parameters::default(),
        };

        if let Some(v) = self.current_savings {
            params.current_savings = v;
        }
        if let Some(v) = self.init_contrib {
            params.init_contrib = v;
        }
        if let Some(v) = self.init_age {
            params.init_age = v;
        }
        if let Some(v) = self.second_contrib {
            params.second_contrib = v;
        }
        if let Some(v) = self.second_age {
            params.second_age = v;
        }
        if self.no_second {
            params.use_second = false;
        }
        if let Some(v) = self.employer_rate {
            params.employer_rate = v;
        }
        if let Some(v) = self.annual_return {
            params.annual_return = v;
        }
        if let Some(v) = self.periods_per_year {
            params.periods_per_year = v;
        }
        if let Some(v) = self.retirement_age {
            params.retirement_age = v;
        }

        Ok(params)
    }

    fn engine(&self) -> Result<ProjectionEngine> {
        if let Some(path) = &self.limits {
            let table = LimitTable::from_csv_path(path)
                .with_context(|| format!("loading limit table from {}", path.display()))?;
            return Ok(ProjectionEngine::with_limits(Arc::new(table)));
        }
        if self.irs_limits {
            return Ok(ProjectionEngine::with_limits(Arc::new(LimitTable::irs_2025())));
        }
        Ok(ProjectionEngine::new())
    }

    fn report_options(&self) -> ReportOptions {
        let plan_start_year = if self.calendar {
            Some(chrono::Local::now().year())
        } else {
            self.start_year
        };

        ReportOptions {
            age_label: if self.end_of_year_age {
                AgeLabel::EndOfYear
            } else {
                AgeLabel::StartOfYear
            },
            include_baseline: self.baseline,
            plan_start_year,
        }
    }
}

fn parse_frequency(value: &str) -> Result<CompoundingFrequency, String> {
    match value.to_ascii_lowercase().as_str() {
        "quarterly" => Ok(CompoundingFrequency::Quarterly),
        "monthly" => Ok(CompoundingFrequency::Monthly),
        "biweekly" => Ok(CompoundingFrequency::Biweekly),
        other => {
            let periods: u32 = other
                .parse()
                .map_err(|_| format!("unknown compounding frequency: {}", value))?;
            CompoundingFrequency::try_from(periods).map_err(|e| e.to_string())
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let params = cli.parameters()?;
    let engine = cli.engine()?;

    let result = engine
        .project(&params)
        .context("invalid projection parameters")?;

    println!("{}\n", chart_title(&params));

    let rows = display_rows(&result.records, &cli.report_options());
    if !cli.quiet {
        print!("{}", render_table(&rows));
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Years:               {}", summary.total_years);
    println!("  Starting Savings:    ${:.2}", summary.starting_savings);
    println!("  Total Contributions: ${:.2}", summary.total_contributions);
    println!("  Total Earnings:      ${:.2}", summary.total_earnings);
    println!("  Final Balance:       ${:.2}", summary.final_balance);

    write_csv_file(&rows, &cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    info!("wrote {} rows to {}", rows.len(), cli.output.display());
    println!("\nFull results written to: {}", cli.output.display());

    Ok(())
}

//! Presentation of projection results
//!
//! Everything here reads finished `AnnualRecord`s and never feeds back into
//! the projection. Rounding to cents happens only in this module.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::ReportError;
use crate::params::Parameters;
use crate::projection::AnnualRecord;

/// Which age a display row is labelled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgeLabel {
    /// Age at the start of the plan year (the record's own age)
    #[default]
    StartOfYear,
    /// Age at the end of the plan year
    EndOfYear,
}

/// Options for turning records into display rows
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub age_label: AgeLabel,

    /// Prepend a Year 0 row holding only the starting savings
    pub include_baseline: bool,

    /// Calendar year in which plan year 1 begins
    pub plan_start_year: Option<i32>,
}

/// One row of the display table and CSV export, rounded to cents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    #[serde(rename = "Year")]
    pub year: u32,
    #[serde(rename = "CalendarYear")]
    pub calendar_year: Option<i32>,
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Contributions")]
    pub contributions: f64,
    #[serde(rename = "Earnings")]
    pub earnings: f64,
    #[serde(rename = "Total")]
    pub total: f64,
}

/// Round a money amount to cents for display
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Build display rows from engine records
pub fn display_rows(records: &[AnnualRecord], options: &ReportOptions) -> Vec<DisplayRow> {
    let calendar = |year: u32| options.plan_start_year.map(|start| start + year as i32 - 1);
    let mut rows = Vec::with_capacity(records.len() + 1);

    if options.include_baseline {
        if let Some(first) = records.first() {
            rows.push(DisplayRow {
                year: 0,
                calendar_year: options.plan_start_year.map(|start| start - 1),
                age: first.age,
                contributions: 0.0,
                earnings: 0.0,
                total: round_cents(first.starting_savings),
            });
        }
    }

    for record in records {
        let age = match options.age_label {
            AgeLabel::StartOfYear => record.age,
            AgeLabel::EndOfYear => record.age + 1,
        };
        rows.push(DisplayRow {
            year: record.year,
            calendar_year: calendar(record.year),
            age,
            contributions: round_cents(record.contributions_cumulative),
            earnings: round_cents(record.earnings_cumulative),
            total: round_cents(record.reconciled_total()),
        });
    }

    rows
}

/// Descriptive chart title for a parameter set
pub fn chart_title(params: &Parameters) -> String {
    let mut schedule = if params.use_second {
        format!(
            "{}/year at Age {}, then {}/year at Age {} until Age {}",
            format_dollars(params.init_contrib),
            params.init_age,
            format_dollars(params.second_contrib),
            params.second_age,
            params.retirement_age
        )
    } else {
        format!(
            "{}/year from Age {} until Age {}",
            format_dollars(params.init_contrib),
            params.init_age,
            params.retirement_age
        )
    };
    if params.employer_rate > 0.0 {
        schedule.push_str(&format!(
            ", plus {:.0}% Employer Contribution",
            params.employer_rate * 100.0
        ));
    }

    let mut title = format!(
        "Future Value Calculation for Keogh/401(k)\n\
         Assuming {:.1}% Annual Return (Compounded {}) Over {} Years\n",
        params.annual_return * 100.0,
        params.periods_per_year.as_str(),
        params.years()
    );
    if params.current_savings > 0.0 {
        title.push_str(&format!(
            "Starting from {} in Current Savings\n",
            format_dollars(params.current_savings)
        ));
    }
    title.push_str(&schedule);
    title.push_str("\n(For Illustrative Purposes Only)");
    title
}

/// Whole dollars with thousands separators, e.g. `$1,234,567`
pub fn format_dollars(amount: f64) -> String {
    let whole = amount.round().abs() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0.0 && whole > 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Fixed-width console table
pub fn render_table(rows: &[DisplayRow]) -> String {
    let mut out = format!(
        "{:>5} {:>6} {:>4} {:>16} {:>16} {:>16}\n",
        "Year", "Cal", "Age", "Contributions", "Earnings", "Total"
    );
    out.push_str(&"-".repeat(68));
    out.push('\n');

    for row in rows {
        let calendar = row
            .calendar_year
            .map(|y| y.to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{:>5} {:>6} {:>4} {:>16.2} {:>16.2} {:>16.2}\n",
            row.year, calendar, row.age, row.contributions, row.earnings, row.total
        ));
    }

    out
}

/// Write display rows as CSV
pub fn write_csv<W: Write>(rows: &[DisplayRow], writer: W) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write display rows to a CSV file
pub fn write_csv_file<P: AsRef<Path>>(rows: &[DisplayRow], path: P) -> Result<(), ReportError> {
    let file = File::create(path)?;
    write_csv(rows, file)
}

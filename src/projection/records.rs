//! Annual output records for projections

use serde::{Deserialize, Serialize};

/// One plan year of the projection ledger
///
/// Records are emitted at the end of each plan year and never modified
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualRecord {
    /// Plan year (1-indexed)
    pub year: u32,

    /// Age at the start of the plan year
    pub age: u32,

    /// Employee plus employer contributions to date
    pub contributions_cumulative: f64,

    /// Investment earnings to date
    pub earnings_cumulative: f64,

    /// Balance at the start of the plan (echoed on every row)
    pub starting_savings: f64,

    /// Employee plus employer contributions made during this plan year
    pub yearly_contribution: f64,

    /// Balance at the end of the plan year
    pub total_balance: f64,
}

impl AnnualRecord {
    /// `starting_savings + contributions_cumulative + earnings_cumulative`
    ///
    /// Equal to `total_balance` up to floating-point accumulation error.
    pub fn reconciled_total(&self) -> f64 {
        self.starting_savings + self.contributions_cumulative + self.earnings_cumulative
    }
}

/// Complete projection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Annual records in ascending plan year order
    pub records: Vec<AnnualRecord>,

    /// Per-period growth rate used for the run
    pub rate_per_period: f64,

    /// Number of compounding periods simulated
    pub total_periods: u32,
}

impl ProjectionResult {
    pub fn new(rate_per_period: f64, total_periods: u32) -> Self {
        Self {
            records: Vec::new(),
            rate_per_period,
            total_periods,
        }
    }

    /// Add an annual record
    pub fn add_record(&mut self, record: AnnualRecord) {
        self.records.push(record);
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let last = self.records.last();

        ProjectionSummary {
            total_years: self.records.len() as u32,
            starting_savings: last.map(|r| r.starting_savings).unwrap_or(0.0),
            total_contributions: last.map(|r| r.contributions_cumulative).unwrap_or(0.0),
            total_earnings: last.map(|r| r.earnings_cumulative).unwrap_or(0.0),
            final_balance: last.map(|r| r.total_balance).unwrap_or(0.0),
            retirement_age: last.map(|r| r.age + 1).unwrap_or(0),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub starting_savings: f64,
    pub total_contributions: f64,
    pub total_earnings: f64,
    pub final_balance: f64,
    pub retirement_age: u32,
}

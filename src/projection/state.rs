//! Running state for a single projection

use super::records::AnnualRecord;

/// Accumulators carried from period to period
///
/// Owned by one projection run; nothing here is shared between runs.
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Starting balance, echoed on every record
    pub starting_savings: f64,

    /// Current balance
    pub balance: f64,

    /// Contributions (employee + employer) to date
    pub cumulative_contributions: f64,

    /// Earnings to date
    pub cumulative_earnings: f64,

    /// Plan year currently being simulated (0-indexed)
    pub year_index: u32,

    /// Age at the start of the current plan year
    pub age: u32,

    /// Employee deposit per period for the current plan year
    pub employee_per_period: f64,

    /// Employer deposit per period for the current plan year
    pub employer_per_period: f64,

    /// Contributions made so far in the current plan year
    pub ytd_contribution: f64,
}

impl ProjectionState {
    pub fn new(starting_savings: f64, init_age: u32) -> Self {
        Self {
            starting_savings,
            balance: starting_savings,
            cumulative_contributions: 0.0,
            cumulative_earnings: 0.0,
            year_index: 0,
            age: init_age,
            employee_per_period: 0.0,
            employer_per_period: 0.0,
            ytd_contribution: 0.0,
        }
    }

    /// Fix the contribution schedule for a new plan year
    ///
    /// The per-period amounts set here hold for every period of the year.
    pub fn begin_year(
        &mut self,
        year_index: u32,
        age: u32,
        employee_per_period: f64,
        employer_per_period: f64,
    ) {
        self.year_index = year_index;
        self.age = age;
        self.employee_per_period = employee_per_period;
        self.employer_per_period = employer_per_period;
        self.ytd_contribution = 0.0;
    }

    /// Total deposit for one period of the current year
    pub fn period_contribution(&self) -> f64 {
        self.employee_per_period + self.employer_per_period
    }

    /// Deposit this period's contribution, then grow the balance
    ///
    /// Returns the earnings credited. The deposit earns a full period of
    /// growth.
    pub fn apply_period(&mut self, rate_per_period: f64) -> f64 {
        let contribution = self.period_contribution();

        self.balance += contribution;
        let earnings = self.balance * rate_per_period;
        self.balance += earnings;

        self.cumulative_contributions += contribution;
        self.cumulative_earnings += earnings;
        self.ytd_contribution += contribution;

        earnings
    }

    /// Snapshot the state at the end of the current plan year
    pub fn close_year(&self) -> AnnualRecord {
        AnnualRecord {
            year: self.year_index + 1,
            age: self.age,
            contributions_cumulative: self.cumulative_contributions,
            earnings_cumulative: self.cumulative_earnings,
            starting_savings: self.starting_savings,
            yearly_contribution: self.ytd_contribution,
            total_balance: self.balance,
        }
    }
}

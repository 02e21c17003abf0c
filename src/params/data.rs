//! Plan parameter structures

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Oldest supported retirement age; bounds the number of simulated periods
pub const MAX_RETIREMENT_AGE: u32 = 100;

/// Upper bound the engine accepts for the nominal annual return
pub const MAX_ANNUAL_RETURN: f64 = 1.0;

/// How many compounding periods make up one plan year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum CompoundingFrequency {
    /// 4 periods per year
    Quarterly,
    /// 12 periods per year
    Monthly,
    /// 26 periods per year
    Biweekly,
}

impl CompoundingFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Biweekly => 26,
        }
    }

    /// Name used in chart titles and table headers
    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundingFrequency::Quarterly => "Quarterly",
            CompoundingFrequency::Monthly => "Monthly",
            CompoundingFrequency::Biweekly => "Biweekly",
        }
    }

    /// Per-period rate geometrically equivalent to a nominal annual rate
    ///
    /// `(1 + annual)^(1/n) - 1`, so that compounding it `n` times reproduces
    /// exactly one year of `annual` growth.
    pub fn rate_per_period(&self, annual_return: f64) -> f64 {
        (1.0 + annual_return).powf(1.0 / self.periods_per_year() as f64) - 1.0
    }
}

impl TryFrom<u32> for CompoundingFrequency {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(CompoundingFrequency::Quarterly),
            12 => Ok(CompoundingFrequency::Monthly),
            26 => Ok(CompoundingFrequency::Biweekly),
            other => Err(ValidationError::UnsupportedFrequency(other)),
        }
    }
}

impl From<CompoundingFrequency> for u32 {
    fn from(value: CompoundingFrequency) -> Self {
        value.periods_per_year()
    }
}

impl Default for CompoundingFrequency {
    fn default() -> Self {
        CompoundingFrequency::Biweekly
    }
}

/// A complete, immutable parameter set for one projection
///
/// Money amounts are annual and in plan currency; rates are decimals
/// (0.06 for 6%). Missing fields deserialize to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Balance already saved at the start of the plan
    pub current_savings: f64,

    /// Annual contribution before the second schedule age
    pub init_contrib: f64,

    /// Age at the start of the plan
    pub init_age: u32,

    /// Whether the second contribution schedule applies
    pub use_second: bool,

    /// Annual contribution from `second_age` onward
    pub second_contrib: f64,

    /// Age at which the second schedule takes over
    pub second_age: u32,

    /// Employer contribution as a fraction of the employee contribution
    pub employer_rate: f64,

    /// Nominal annual growth rate
    pub annual_return: f64,

    /// Compounding frequency
    pub periods_per_year: CompoundingFrequency,

    /// Plan horizon; the last simulated year starts at `retirement_age - 1`
    pub retirement_age: u32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            current_savings: 0.0,
            init_contrib: 50_000.0,
            init_age: 35,
            use_second: true,
            second_contrib: 55_000.0,
            second_age: 50,
            employer_rate: 0.0,
            annual_return: 0.06,
            periods_per_year: CompoundingFrequency::Biweekly,
            retirement_age: 90,
        }
    }
}

impl Parameters {
    /// Check every precondition of a projection
    ///
    /// The cross-field age rules are always re-checked here even when an
    /// input surface has already range-limited the individual fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_negative("current_savings", self.current_savings)?;
        positive("init_contrib", self.init_contrib)?;
        non_negative("second_contrib", self.second_contrib)?;
        if self.use_second {
            positive("second_contrib", self.second_contrib)?;
        }
        within("employer_rate", self.employer_rate, 0.0, 1.0)?;
        within("annual_return", self.annual_return, 0.0, MAX_ANNUAL_RETURN)?;

        if self.use_second && self.second_age < self.init_age {
            return Err(ValidationError::SecondAgeBeforeStart {
                second_age: self.second_age,
                init_age: self.init_age,
            });
        }
        if self.retirement_age <= self.init_age {
            return Err(ValidationError::EmptyHorizon {
                retirement_age: self.retirement_age,
                init_age: self.init_age,
            });
        }
        if self.retirement_age > MAX_RETIREMENT_AGE {
            return Err(ValidationError::HorizonTooLong {
                retirement_age: self.retirement_age,
                max: MAX_RETIREMENT_AGE,
            });
        }

        Ok(())
    }

    /// Number of whole plan years simulated
    pub fn years(&self) -> u32 {
        self.retirement_age.saturating_sub(self.init_age)
    }

    /// Total number of compounding periods simulated
    pub fn total_periods(&self) -> u32 {
        self.years() * self.periods_per_year.periods_per_year()
    }

    pub fn rate_per_period(&self) -> f64 {
        self.periods_per_year.rate_per_period(self.annual_return)
    }

    /// Annual employee contribution for a plan year starting at `age`
    ///
    /// The schedule is chosen once per plan year from the age at the start
    /// of that year; it never changes partway through a year.
    pub fn annual_contribution_at(&self, age: u32) -> f64 {
        if self.use_second && age >= self.second_age {
            self.second_contrib
        } else {
            self.init_contrib
        }
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(())
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, value, min, max });
    }
    Ok(())
}

//! Optional statutory contribution limits
//!
//! Limits are policy, not part of the projection recurrence. When an engine
//! is given a limit, the annual employee and employer amounts for each plan
//! year are clamped once, before they are split into per-period deposits.

use std::fs::File;
use std::path::Path;

use csv::Reader;
use log::warn;
use serde::Deserialize;

use crate::error::LoadError;

/// A rule that caps the annual contributions for a plan year
pub trait ContributionLimit: std::fmt::Debug {
    /// Annual `(employee, employer)` amounts for a plan year that starts at
    /// `age`. The employer amount is `employer_rate` times the clamped
    /// employee amount, then clamped itself. Neither exceeds its unclamped
    /// value.
    fn clamp(&self, age: u32, employee_annual: f64, employer_rate: f64) -> (f64, f64);
}

/// Elective-deferral and total-additions caps with age-based catch-up
#[derive(Debug, Clone, PartialEq)]
pub struct LimitTable {
    /// Plan year the limits belong to, e.g. "2025"
    pub year_label: String,

    /// Cap on the employee's own annual deferrals
    pub elective_deferral: f64,

    /// Cap on employee plus employer additions
    pub total_additions: f64,

    /// Catch-up allowance by age, ascending; each entry applies from its age
    /// until the next entry
    catch_up: Vec<(u32, f64)>,
}

impl Default for LimitTable {
    fn default() -> Self {
        Self::irs_2025()
    }
}

impl LimitTable {
    pub fn new(
        year_label: impl Into<String>,
        elective_deferral: f64,
        total_additions: f64,
        mut catch_up: Vec<(u32, f64)>,
    ) -> Self {
        catch_up.sort_by_key(|(age, _)| *age);
        Self {
            year_label: year_label.into(),
            elective_deferral,
            total_additions,
            catch_up,
        }
    }

    /// 2025 401(k) limits, including the age 60-63 enhanced catch-up
    pub fn irs_2025() -> Self {
        Self::new(
            "2025",
            23_500.0,
            70_000.0,
            vec![(50, 7_500.0), (60, 11_250.0), (64, 7_500.0)],
        )
    }

    /// Catch-up allowance for a plan year starting at `age`
    pub fn catch_up_for(&self, age: u32) -> f64 {
        self.catch_up
            .iter()
            .rev()
            .find(|(from, _)| *from <= age)
            .map(|(_, amount)| *amount)
            .unwrap_or(0.0)
    }

    /// Load a table from CSV with
    /// `year_label,elective_deferral,catch_up,catch_up_age,total_additions`
    /// columns
    ///
    /// One row describes a whole table. Further rows add catch-up tiers and
    /// must repeat the first row's label and caps. `catch_up` may be blank
    /// or zero for no catch-up; a positive `catch_up` needs a `catch_up_age`.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, LoadError> {
        let mut csv_reader = Reader::from_reader(reader);
        let mut table: Option<LimitTable> = None;

        for (index, result) in csv_reader.deserialize().enumerate() {
            let row: LimitRow = result?;
            // Header is line 1
            let line = index + 2;

            if !(row.elective_deferral >= 0.0 && row.total_additions >= 0.0) {
                return Err(LoadError::InvalidTable(format!(
                    "line {}: caps must be non-negative numbers",
                    line
                )));
            }

            let tier = match (row.catch_up, row.catch_up_age) {
                (Some(amount), Some(age)) if amount > 0.0 => Some((age, amount)),
                (Some(amount), None) if amount > 0.0 => {
                    return Err(LoadError::InvalidTable(format!(
                        "line {}: catch_up {} has no catch_up_age",
                        line, amount
                    )));
                }
                (Some(amount), _) if !(amount >= 0.0) => {
                    return Err(LoadError::InvalidTable(format!(
                        "line {}: catch_up must be a non-negative number, got {}",
                        line, amount
                    )));
                }
                _ => None,
            };

            if let Some(existing) = table.as_mut() {
                if existing.year_label != row.year_label
                    || existing.elective_deferral != row.elective_deferral
                    || existing.total_additions != row.total_additions
                {
                    return Err(LoadError::InvalidTable(format!(
                        "line {}: label and caps differ from table {}",
                        line, existing.year_label
                    )));
                }
                existing.catch_up.extend(tier);
            } else {
                table = Some(Self::new(
                    row.year_label,
                    row.elective_deferral,
                    row.total_additions,
                    tier.into_iter().collect(),
                ));
            }
        }

        let mut table = table.ok_or_else(|| LoadError::Empty("limit table".to_string()))?;
        table.catch_up.sort_by_key(|(age, _)| *age);
        Ok(table)
    }
}

impl ContributionLimit for LimitTable {
    fn clamp(&self, age: u32, employee_annual: f64, employer_rate: f64) -> (f64, f64) {
        let catch_up = self.catch_up_for(age);

        let employee = employee_annual.min(self.elective_deferral + catch_up);
        let employer_room = (self.total_additions + catch_up - employee).max(0.0);
        let employer = (employee * employer_rate).min(employer_room);

        if employee < employee_annual || employer < employee_annual * employer_rate {
            warn!(
                "age {}: contributions clamped from {:.2}/{:.2} to {:.2}/{:.2}",
                age,
                employee_annual,
                employee_annual * employer_rate,
                employee,
                employer
            );
        }

        (employee, employer)
    }
}

#[derive(Debug, Deserialize)]
struct LimitRow {
    year_label: String,
    elective_deferral: f64,
    catch_up: Option<f64>,
    catch_up_age: Option<u32>,
    total_additions: f64,
}

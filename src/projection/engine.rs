//! Core projection engine for period-by-period savings projections

use std::sync::Arc;

use log::{debug, info};

use super::records::ProjectionResult;
use super::state::ProjectionState;
use crate::error::ValidationError;
use crate::limits::ContributionLimit;
use crate::params::Parameters;

/// Project a parameter set with no contribution limits applied
///
/// Validates `params` first; on any violation no records are produced.
pub fn project(params: &Parameters) -> Result<ProjectionResult, ValidationError> {
    ProjectionEngine::new().project(params)
}

/// Main projection engine
///
/// Holds no per-run state, so one engine can serve any number of
/// projections, including concurrently.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    limits: Option<Arc<dyn ContributionLimit + Send + Sync>>,
}

impl ProjectionEngine {
    /// Create an engine that projects contributions as given
    pub fn new() -> Self {
        Self { limits: None }
    }

    /// Create an engine that clamps each plan year's contributions
    pub fn with_limits(limits: Arc<dyn ContributionLimit + Send + Sync>) -> Self {
        Self { limits: Some(limits) }
    }

    /// Run the projection and return one record per plan year
    pub fn project(&self, params: &Parameters) -> Result<ProjectionResult, ValidationError> {
        params.validate()?;

        let periods_per_year = params.periods_per_year.periods_per_year();
        let rate_per_period = params.rate_per_period();
        let total_periods = params.total_periods();

        debug!(
            "projecting {} years ({} {} periods) at {:.10} per period",
            params.years(),
            total_periods,
            params.periods_per_year.as_str(),
            rate_per_period
        );

        let mut result = ProjectionResult::new(rate_per_period, total_periods);
        let mut state = ProjectionState::new(params.current_savings, params.init_age);

        for period in 0..total_periods {
            let year_index = period / periods_per_year;
            let position_in_year = period % periods_per_year;

            if position_in_year == 0 {
                let age = params.init_age + year_index;
                let (employee, employer) = self.year_schedule(params, age);
                if params.use_second && age == params.second_age {
                    debug!("age {}: switching to second contribution schedule", age);
                }
                state.begin_year(year_index, age, employee, employer);
            }

            state.apply_period(rate_per_period);

            if position_in_year == periods_per_year - 1 {
                result.add_record(state.close_year());
            }
        }

        let summary = result.summary();
        info!(
            "projection complete: {} years, contributions {:.2}, earnings {:.2}, balance {:.2}",
            summary.total_years,
            summary.total_contributions,
            summary.total_earnings,
            summary.final_balance
        );

        Ok(result)
    }

    /// Per-period `(employee, employer)` deposits for a plan year starting at `age`
    fn year_schedule(&self, params: &Parameters, age: u32) -> (f64, f64) {
        let periods = params.periods_per_year.periods_per_year() as f64;
        let employee_annual = params.annual_contribution_at(age);

        match &self.limits {
            None => {
                let employee = employee_annual / periods;
                (employee, employee * params.employer_rate)
            }
            Some(limits) => {
                let (employee, employer) = limits.clamp(age, employee_annual, params.employer_rate);
                (employee / periods, employer / periods)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::LimitTable;
    use crate::params::CompoundingFrequency;
    use crate::projection::AnnualRecord;
    use approx::assert_relative_eq;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn single_schedule() -> Parameters {
        Parameters {
            current_savings: 0.0,
            init_contrib: 50_000.0,
            init_age: 35,
            use_second: false,
            second_contrib: 55_000.0,
            second_age: 50,
            employer_rate: 0.0,
            annual_return: 0.06,
            periods_per_year: CompoundingFrequency::Biweekly,
            retirement_age: 65,
        }
    }

    fn assert_reconciles(record: &AnnualRecord) {
        assert_relative_eq!(
            record.total_balance,
            record.reconciled_total(),
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_one_year_biweekly_matches_closed_form() {
        let params = Parameters { retirement_age: 36, ..single_schedule() };
        let result = project(&params).unwrap();

        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.year, 1);
        assert_eq!(record.age, 35);
        assert_relative_eq!(record.contributions_cumulative, 50_000.0, max_relative = 1e-12);

        // 26 deposits, each growing from its own period onward:
        // c * sum_{k=1..26} (1+r)^k = c * (1+r) * ((1+r)^26 - 1) / r
        let r = 1.06_f64.powf(1.0 / 26.0) - 1.0;
        let c = 50_000.0 / 26.0;
        let expected = c * (1.0 + r) * ((1.0 + r).powi(26) - 1.0) / r;
        assert_relative_eq!(record.total_balance, expected, max_relative = 1e-10);
        assert_relative_eq!(result.rate_per_period, r, max_relative = 1e-12);
        assert_eq!(result.total_periods, 26);
        assert_reconciles(record);
    }

    #[test]
    fn test_one_year_matches_iterative_reference() {
        for freq in [
            CompoundingFrequency::Quarterly,
            CompoundingFrequency::Monthly,
            CompoundingFrequency::Biweekly,
        ] {
            let params = Parameters {
                current_savings: 12_345.0,
                employer_rate: 0.25,
                periods_per_year: freq,
                retirement_age: 36,
                ..single_schedule()
            };
            let n = freq.periods_per_year();
            let r = 1.06_f64.powf(1.0 / n as f64) - 1.0;
            let deposit = 50_000.0 / n as f64 * 1.25;
            let mut balance = 12_345.0;
            for _ in 0..n {
                balance += deposit;
                balance += balance * r;
            }

            let result = project(&params).unwrap();
            assert_relative_eq!(result.records[0].total_balance, balance, max_relative = 1e-12);
            assert_relative_eq!(
                result.records[0].contributions_cumulative,
                62_500.0,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_record_count_and_order() {
        let params = single_schedule();
        let result = project(&params).unwrap();

        assert_eq!(result.records.len(), 30);
        for (idx, record) in result.records.iter().enumerate() {
            assert_eq!(record.year, idx as u32 + 1);
            assert_eq!(record.age, 35 + idx as u32);
            assert_eq!(record.starting_savings, 0.0);
            assert_reconciles(record);
        }
    }

    #[test]
    fn test_schedule_switch_is_whole_year() {
        let params = Parameters { use_second: true, ..single_schedule() };
        let result = project(&params).unwrap();

        let at_49 = result.records.iter().find(|r| r.age == 49).unwrap();
        let at_50 = result.records.iter().find(|r| r.age == 50).unwrap();
        assert_eq!(at_49.year, 15);
        assert_eq!(at_50.year, 16);
        assert_relative_eq!(at_49.yearly_contribution, 50_000.0, max_relative = 1e-12);
        assert_relative_eq!(at_50.yearly_contribution, 55_000.0, max_relative = 1e-12);

        let delta = at_50.contributions_cumulative - at_49.contributions_cumulative;
        assert_relative_eq!(delta, 55_000.0, max_relative = 1e-9);

        // Fifteen years of the first schedule, then the second
        let first = &result.records[..15];
        let second = &result.records[15..];
        assert!(first.iter().all(|r| (r.yearly_contribution - 50_000.0).abs() < 1e-6));
        assert!(second.iter().all(|r| (r.yearly_contribution - 55_000.0).abs() < 1e-6));
    }

    #[test]
    fn test_second_schedule_from_first_year() {
        let params = Parameters { use_second: true, second_age: 35, ..single_schedule() };
        let result = project(&params).unwrap();
        assert_relative_eq!(result.records[0].yearly_contribution, 55_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_growth_conserves_contributions() {
        let params = Parameters {
            current_savings: 5_000.0,
            use_second: true,
            annual_return: 0.0,
            employer_rate: 0.0,
            ..single_schedule()
        };
        let result = project(&params).unwrap();
        let last = result.records.last().unwrap();

        let nominal: f64 = (35..65).map(|age| params.annual_contribution_at(age)).sum();
        assert_relative_eq!(last.contributions_cumulative, nominal, max_relative = 1e-9);
        assert_eq!(last.earnings_cumulative, 0.0);
        assert_relative_eq!(last.total_balance, 5_000.0 + nominal, max_relative = 1e-9);
    }

    #[test]
    fn test_employer_rate_scales_contributions() {
        let params = Parameters { employer_rate: 0.5, annual_return: 0.0, ..single_schedule() };
        let result = project(&params).unwrap();
        assert_relative_eq!(
            result.records[0].yearly_contribution,
            75_000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_more_frequent_deposits_arrive_later() {
        // With a geometrically equivalent per-period rate, starting savings
        // grow identically at any frequency; splitting the annual amount into
        // more, smaller deposits delays money on average, so the balance
        // falls slightly as the frequency rises.
        let balance_at = |freq| {
            let params = Parameters { periods_per_year: freq, current_savings: 10_000.0, ..single_schedule() };
            project(&params).unwrap().summary().final_balance
        };
        let quarterly = balance_at(CompoundingFrequency::Quarterly);
        let monthly = balance_at(CompoundingFrequency::Monthly);
        let biweekly = balance_at(CompoundingFrequency::Biweekly);

        assert!(quarterly > monthly);
        assert!(monthly > biweekly);
        // All within a fraction of a percent of each other
        assert!((quarterly - biweekly) / biweekly < 0.01);
    }

    #[test]
    fn test_starting_savings_compound_at_annual_rate() {
        let params = Parameters {
            current_savings: 100_000.0,
            init_contrib: 1e-9,
            periods_per_year: CompoundingFrequency::Monthly,
            retirement_age: 45,
            ..single_schedule()
        };
        let result = project(&params).unwrap();
        let expected = 100_000.0 * 1.06_f64.powi(10);
        assert_relative_eq!(result.summary().final_balance, expected, max_relative = 1e-9);
    }

    #[test]
    fn test_rejects_second_age_before_start() {
        let params = Parameters {
            init_age: 40,
            second_age: 35,
            use_second: true,
            retirement_age: 65,
            ..single_schedule()
        };
        assert_eq!(
            project(&params).unwrap_err(),
            ValidationError::SecondAgeBeforeStart { second_age: 35, init_age: 40 }
        );
    }

    #[test]
    fn test_rejects_empty_horizon() {
        let params = Parameters { retirement_age: 35, ..single_schedule() };
        assert!(matches!(project(&params), Err(ValidationError::EmptyHorizon { .. })));
    }

    #[test]
    fn test_limits_clamp_deposits() {
        let engine = ProjectionEngine::with_limits(Arc::new(LimitTable::irs_2025()));
        let params = Parameters {
            employer_rate: 1.0,
            annual_return: 0.0,
            retirement_age: 55,
            ..single_schedule()
        };
        let result = engine.project(&params).unwrap();

        // Age 35: 23,500 deferral + 23,500 employer (under the 70,000 cap)
        assert_relative_eq!(result.records[0].yearly_contribution, 47_000.0, max_relative = 1e-12);
        // Age 50: catch-up raises the employee cap to 31,000
        let at_50 = result.records.iter().find(|r| r.age == 50).unwrap();
        assert_relative_eq!(at_50.yearly_contribution, 62_000.0, max_relative = 1e-12);
        for record in &result.records {
            assert_reconciles(record);
        }
    }

    #[test]
    fn test_plain_engine_matches_free_function() {
        let params = Parameters::default();
        let a = project(&params).unwrap();
        let b = ProjectionEngine::new().project(&params).unwrap();
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn test_concurrent_projections_are_independent() {
        let engine = ProjectionEngine::new();
        let params = Parameters::default();
        let expected = engine.project(&params).unwrap().records;

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| engine.project(&params).unwrap().records))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_records_reconcile_and_never_decrease(
            current_savings in 0.0f64..1_000_000.0,
            init_contrib in 1_000.0f64..1_000_000.0,
            second_contrib in 1_000.0f64..1_000_000.0,
            init_age in 18u32..80,
            second_offset in 0u32..30,
            horizon in 1u32..20,
            use_second in proptest::bool::ANY,
            employer_rate in 0.0f64..1.0,
            annual_return in 0.0f64..0.20,
            freq_idx in 0usize..3,
        ) {
            let freqs = [
                CompoundingFrequency::Quarterly,
                CompoundingFrequency::Monthly,
                CompoundingFrequency::Biweekly,
            ];
            let params = Parameters {
                current_savings,
                init_contrib,
                init_age,
                use_second,
                second_contrib,
                second_age: init_age + second_offset,
                employer_rate,
                annual_return,
                periods_per_year: freqs[freq_idx],
                retirement_age: (init_age + horizon).min(100),
            };
            let result = project(&params).unwrap();

            prop_assert_eq!(result.records.len() as u32, params.retirement_age - params.init_age);

            let mut prev: Option<&AnnualRecord> = None;
            for record in &result.records {
                let total = record.reconciled_total();
                prop_assert!((record.total_balance - total).abs() <= 1e-6 * total.abs().max(1.0));

                if let Some(p) = prev {
                    prop_assert!(record.contributions_cumulative >= p.contributions_cumulative);
                    prop_assert!(record.earnings_cumulative >= p.earnings_cumulative);
                    prop_assert!(record.total_balance >= p.total_balance);
                    prop_assert_eq!(record.year, p.year + 1);
                }
                prev = Some(record);
            }
        }

        #[test]
        fn prop_invalid_second_age_never_projects(
            init_age in 19u32..80,
            gap in 1u32..19,
        ) {
            let params = Parameters {
                init_age,
                second_age: init_age.saturating_sub(gap),
                use_second: true,
                retirement_age: init_age + 1,
                ..Parameters::default()
            };
            prop_assert!(project(&params).is_err());
        }
    }
}

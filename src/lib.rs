//! Savings Projection - period-by-period retirement savings projections
//!
//! This library provides:
//! - Validated plan parameters with one or two age-gated contribution schedules
//! - A deposit-then-earn projection engine producing annual records
//! - Optional statutory contribution limits
//! - Display tables, chart titles and CSV export of projection results

pub mod error;
pub mod params;
pub mod limits;
pub mod projection;
pub mod report;

// Re-export commonly used types
pub use error::{LoadError, ReportError, ValidationError};
pub use params::{CompoundingFrequency, Parameters};
pub use limits::{ContributionLimit, LimitTable};
pub use projection::{project, AnnualRecord, ProjectionEngine, ProjectionResult};

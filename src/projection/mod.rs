//! Projection engine for retirement savings projections

mod state;
mod engine;
mod records;

pub use state::ProjectionState;
pub use engine::{project, ProjectionEngine};
pub use records::{AnnualRecord, ProjectionResult, ProjectionSummary};

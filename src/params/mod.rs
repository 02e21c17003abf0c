//! Plan parameters, validation and parameter file loading

mod data;
pub mod loader;

pub use data::{CompoundingFrequency, Parameters, MAX_ANNUAL_RETURN, MAX_RETIREMENT_AGE};
pub use loader::{load_params, load_params_csv, load_params_from_reader, read_params};

//! Load parameter sets from JSON or CSV files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::debug;

use super::Parameters;
use crate::error::LoadError;

/// Load a single parameter set from a JSON file
///
/// Fields missing from the file take their default values. The result is
/// validated before it is returned.
pub fn load_params<P: AsRef<Path>>(path: P) -> Result<Parameters, LoadError> {
    let params = read_params(path)?;
    params.validate()?;
    Ok(params)
}

/// Read a parameter set from a JSON file without validating it
///
/// For callers that merge further overrides before projecting; the engine
/// validates the merged set.
pub fn read_params<P: AsRef<Path>>(path: P) -> Result<Parameters, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let params: Parameters = serde_json::from_reader(file)?;
    debug!("read parameters from {}", path.display());
    Ok(params)
}

/// Load a single parameter set from any JSON reader
pub fn load_params_from_reader<R: Read>(reader: R) -> Result<Parameters, LoadError> {
    let params: Parameters = serde_json::from_reader(reader)?;
    params.validate()?;
    Ok(params)
}

/// Load one parameter set per row from a CSV file with snake_case headers
pub fn load_params_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Parameters>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rows = load_params_csv_from_reader(file)?;
    if rows.is_empty() {
        return Err(LoadError::Empty(path.display().to_string()));
    }
    Ok(rows)
}

/// Load parameter rows from any CSV reader
pub fn load_params_csv_from_reader<R: Read>(reader: R) -> Result<Vec<Parameters>, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let params: Parameters = result?;
        params.validate()?;
        rows.push(params);
    }

    Ok(rows)
}

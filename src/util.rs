use crate::dto::{InputFile, PipelineConfig};
use crate::error::ServiceError;
use std::env;
use std::fs;
use std::path::Path;

pub fn get_env_var(name: &str) -> Result<String, ServiceError> {
    env::var(name).map_err(|_| {
        ServiceError::config(&format!("Environment variable '{}' not found", name))
    })
}

/// Parses a field delimiter given as a single ASCII character.
pub fn parse_delimiter(value: &str) -> Result<u8, ServiceError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(ServiceError::config(format!(
            "Delimiter must be a single ASCII character, got '{}'",
            value
        ))),
    }
}

impl PipelineConfig {
    /// Builds the configuration from `MERGE_*` environment variables, falling
    /// back to the built-in paths and delimiters for anything unset.
    pub fn from_env() -> Result<PipelineConfig, ServiceError> {
        Self::from_lookup(|name| get_env_var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<PipelineConfig, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PipelineConfig::default();
        let input = |prefix: &str, default: InputFile| -> Result<InputFile, ServiceError> {
            let path = lookup(prefix).unwrap_or(default.path);
            let delimiter = match lookup(&format!("{prefix}_DELIMITER")) {
                Some(value) => parse_delimiter(&value)?,
                None => default.delimiter,
            };
            Ok(InputFile { path, delimiter })
        };
        Ok(PipelineConfig {
            first: input("MERGE_FILE1", defaults.first)?,
            second: input("MERGE_FILE2", defaults.second)?,
            output_json: lookup("MERGE_OUTPUT_JSON").unwrap_or(defaults.output_json),
            db_path: lookup("MERGE_DB_PATH").unwrap_or(defaults.db_path),
        })
    }
}

pub fn read_file_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, ServiceError> {
    let path = path.as_ref();
    fs::read(path).map_err(|err| {
        ServiceError::read(format!("Unable to read file {}: {}", path.display(), err))
    })
}

pub fn write_file_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), ServiceError> {
    let path = path.as_ref();
    fs::write(path, bytes).map_err(|err| {
        ServiceError::serialize(format!("Unable to write file {}: {}", path.display(), err))
    })
}

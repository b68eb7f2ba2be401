//! Configuration for the intent swap pipeline.
//!
//! Configuration is read from a TOML (or JSON/YAML) file, with `${VAR}`
//! placeholders filled from the environment and a handful of `SWAP_*`
//! overrides applied on top.

use thiserror::Error;

pub mod loader;
pub mod types;

pub use loader::{parse, substitute_env_vars, validate_config, ConfigLoader, MAX_INTENT_TTL_SECS};
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

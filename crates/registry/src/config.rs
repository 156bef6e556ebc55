//! Environment configuration.
//!
//! Read once at startup from TOML:
//!
//! ```toml
//! registry_root = "Environment"
//!
//! [exceptions]
//! echo = true
//!
//! [assertions]
//! dump_backtrace = false
//! abort = true
//! ```
//!
//! Missing keys and tables keep their defaults.

use std::path::{Path, PathBuf};

use arbor_core::{ErrorPolicy, PolicyFlags};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Startup settings of an [`Environment`](crate::Environment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct EnvironmentConfig {
	/// Name of the registry tree's root node.
	pub registry_root: String,
	/// Reactions to raised errors.
	pub exceptions: PolicyFlags,
	/// Reactions to failed invariant checks.
	pub assertions: PolicyFlags,
}

impl Default for EnvironmentConfig {
	fn default() -> Self {
		let policy = ErrorPolicy::default();
		Self {
			registry_root: "Environment".to_string(),
			exceptions: policy.exceptions,
			assertions: policy.assertions,
		}
	}
}

/// Flags as written; absent keys keep the class default.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FlagOverrides {
	echo: Option<bool>,
	dump_backtrace: Option<bool>,
	abort: Option<bool>,
}

impl FlagOverrides {
	fn apply(self, base: PolicyFlags) -> PolicyFlags {
		PolicyFlags {
			echo: self.echo.unwrap_or(base.echo),
			dump_backtrace: self.dump_backtrace.unwrap_or(base.dump_backtrace),
			abort: self.abort.unwrap_or(base.abort),
		}
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
	registry_root: Option<String>,
	exceptions: FlagOverrides,
	assertions: FlagOverrides,
}

impl From<RawConfig> for EnvironmentConfig {
	fn from(raw: RawConfig) -> Self {
		let defaults = Self::default();
		Self {
			registry_root: raw.registry_root.unwrap_or(defaults.registry_root),
			exceptions: raw.exceptions.apply(defaults.exceptions),
			assertions: raw.assertions.apply(defaults.assertions),
		}
	}
}

impl EnvironmentConfig {
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	/// Reads and parses the file at `path`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	/// The policy described by the two flag tables.
	pub fn policy(&self) -> ErrorPolicy {
		ErrorPolicy {
			exceptions: self.exceptions,
			assertions: self.assertions,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_input_is_default() {
		let config = EnvironmentConfig::from_toml_str("").unwrap();
		assert_eq!(config, EnvironmentConfig::default());
		assert_eq!(config.policy(), ErrorPolicy::default());
	}

	#[test]
	fn test_partial_tables_keep_defaults() {
		let config = EnvironmentConfig::from_toml_str(
			r#"
registry_root = "Registry"

[assertions]
abort = true
"#,
		)
		.unwrap();
		assert_eq!(config.registry_root, "Registry");
		assert!(config.assertions.abort);
		assert!(config.assertions.echo);
		assert!(config.assertions.dump_backtrace);
		assert!(config.exceptions.echo);
		assert!(!config.exceptions.dump_backtrace);
	}

	#[test]
	fn test_unknown_key_rejected() {
		let err = EnvironmentConfig::from_toml_str("colour = 3").unwrap_err();
		assert!(matches!(err, ConfigError::Toml(_)));
		assert!(EnvironmentConfig::from_toml_str("[exceptions]\nloud = true").is_err());
	}

	#[test]
	fn test_serialized_config_reloads() {
		let mut config = EnvironmentConfig::default();
		config.exceptions.abort = true;
		let text = toml::to_string(&config).unwrap();
		assert_eq!(EnvironmentConfig::from_toml_str(&text).unwrap(), config);
	}

	#[test]
	fn test_missing_file() {
		let err = EnvironmentConfig::load("/nonexistent/arbor.toml").unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
		assert!(err.to_string().contains("/nonexistent/arbor.toml"));
	}
}

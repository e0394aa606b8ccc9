//! Config file loading for the meadow binary.
//!
//! ```toml
//! [composer]
//! history_capacity = 50
//! debounce_ms = 500
//!
//! [rewrite]
//! kind = "chat"
//! endpoint = "https://example.invalid/openai/deployments/gpt/chat/completions"
//! api_key_env = "MEADOW_REWRITE_KEY"
//! ```

use std::path::{Path, PathBuf};

use meadow_composer::ComposerConfig;
use meadow_rewrite::RewriteConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// TOML syntax or schema error.
	#[error("invalid config {path}: {error}")]
	Parse {
		/// Path to the offending file.
		path: PathBuf,
		/// The underlying decode error.
		error: toml::de::Error,
	},

	/// Composer settings that parse but cannot work.
	#[error("invalid setting {key}: {reason}")]
	Invalid { key: &'static str, reason: &'static str },
}

/// Top-level config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeadowConfig {
	pub composer: ComposerConfig,
	pub rewrite: RewriteConfig,
}

impl MeadowConfig {
	pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(text).map_err(|error| ConfigError::Parse {
			path: path.to_path_buf(),
			error,
		})?;
		config.check()?;
		Ok(config)
	}

	fn check(&self) -> Result<(), ConfigError> {
		if self.composer.history_capacity == 0 {
			return Err(ConfigError::Invalid {
				key: "composer.history_capacity",
				reason: "must be at least 1",
			});
		}
		Ok(())
	}
}

/// Default location: `<config dir>/meadow/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("meadow").join("config.toml"))
}

/// Loads the config.
///
/// An explicit path must exist. A missing default file yields defaults.
pub fn load(explicit: Option<&Path>) -> Result<MeadowConfig, ConfigError> {
	let (path, required) = match explicit {
		Some(path) => (path.to_path_buf(), true),
		None => match default_config_path() {
			Some(path) => (path, false),
			None => return Ok(MeadowConfig::default()),
		},
	};

	let text = match std::fs::read_to_string(&path) {
		Ok(text) => text,
		Err(error) if !required && error.kind() == std::io::ErrorKind::NotFound => {
			debug!(path = %path.display(), "no config file, using defaults");
			return Ok(MeadowConfig::default());
		}
		Err(error) => return Err(ConfigError::Io { path, error }),
	};

	debug!(path = %path.display(), "loaded config");
	MeadowConfig::parse(&path, &text)
}

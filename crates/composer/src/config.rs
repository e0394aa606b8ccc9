//! Composer session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coalescer::DEFAULT_QUIET_PERIOD;
use crate::history::DEFAULT_HISTORY_CAPACITY;

/// What `undo` does when the past stack is empty but the document is not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyUndoPolicy {
	/// Nothing happens. Use [`ComposerSession::clear_document`] to blank the
	/// document as a revertible step.
	///
	/// [`ComposerSession::clear_document`]: crate::ComposerSession::clear_document
	#[default]
	Ignore,
	/// Jump straight to the empty document, pushing the present onto the redo
	/// stack. Matches the legacy web composer.
	ClearDocument,
}

/// Tunables for one composer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposerConfig {
	/// Maximum number of undo checkpoints retained.
	pub history_capacity: usize,
	/// Quiet period after the last keystroke before a burst is checkpointed.
	pub debounce_ms: u64,
	/// Whether submission requires a cover image.
	pub require_image: bool,
	pub empty_undo: EmptyUndoPolicy,
	/// Ask the rewrite service for a topic verdict before handing off a submission.
	pub verify_topic_on_submit: bool,
}

impl Default for ComposerConfig {
	fn default() -> Self {
		Self {
			history_capacity: DEFAULT_HISTORY_CAPACITY,
			debounce_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
			require_image: true,
			empty_undo: EmptyUndoPolicy::Ignore,
			verify_topic_on_submit: true,
		}
	}
}

impl ComposerConfig {
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_documented_values() {
		let config = ComposerConfig::default();

		assert_eq!(config.history_capacity, 50);
		assert_eq!(config.debounce(), Duration::from_millis(500));
		assert_eq!(config.empty_undo, EmptyUndoPolicy::Ignore);
	}

	#[test]
	fn partial_table_falls_back_to_defaults() {
		let config: ComposerConfig = toml::from_str("debounce_ms = 250\nempty_undo = \"clear_document\"").expect("valid config");

		assert_eq!(config.debounce_ms, 250);
		assert_eq!(config.empty_undo, EmptyUndoPolicy::ClearDocument);
		assert_eq!(config.history_capacity, 50);
		assert!(config.require_image);
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let result = toml::from_str::<ComposerConfig>("history_size = 10");
		assert!(result.is_err());
	}
}

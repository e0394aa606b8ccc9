//! Document snapshot and edit provenance types.

use serde::{Deserialize, Serialize};

/// Immutable `{title, content}` value stored in history.
///
/// Snapshots compare structurally. The live document is also a snapshot, but
/// the one held by [`DocumentModel`](crate::DocumentModel) is never itself
/// placed on the past or future stacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentSnapshot {
	pub title: String,
	pub content: String,
}

impl DocumentSnapshot {
	pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			content: content.into(),
		}
	}

	/// The blank document a session starts from.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Returns `true` when both fields are the empty string.
	///
	/// Whitespace counts as content here; see [`validate`](crate::validate)
	/// for the trimmed check used before submission.
	pub fn is_empty(&self) -> bool {
		self.title.is_empty() && self.content.is_empty()
	}
}

/// Kind of history navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryKind {
	Undo,
	Redo,
}

/// Where a document mutation came from.
///
/// Only [`EditOrigin::User`] edits are fed to the coalescer. Everything else
/// is either a history replay or an already-checkpointed atomic replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOrigin {
	/// Keystroke or paste from an input handler.
	User,
	/// Write-back of a snapshot popped from history.
	History(HistoryKind),
	/// Candidate produced by the rewrite service.
	Rewrite,
	/// Session lifecycle resets (submit success, discard).
	Session,
}

impl EditOrigin {
	pub const fn is_user(self) -> bool {
		matches!(self, Self::User)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::User => "user",
			Self::History(HistoryKind::Undo) => "undo",
			Self::History(HistoryKind::Redo) => "redo",
			Self::Rewrite => "rewrite",
			Self::Session => "session",
		}
	}
}

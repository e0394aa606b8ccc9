//! Live document state.

use tracing::trace;

use crate::snapshot::{DocumentSnapshot, EditOrigin};

/// Pre-edit state reported by a [`DocumentModel`] mutator.
///
/// Carries the value the document held *before* the call so the coalescer
/// can record the state to return to, not the keystroke's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditNotice {
	pub pre_edit: DocumentSnapshot,
	pub origin: EditOrigin,
}

/// Holds the present `{title, content}` snapshot.
#[derive(Debug, Clone, Default)]
pub struct DocumentModel {
	present: DocumentSnapshot,
}

impl DocumentModel {
	pub fn new(initial: DocumentSnapshot) -> Self {
		Self { present: initial }
	}

	/// Returns the present snapshot.
	pub fn present(&self) -> &DocumentSnapshot {
		&self.present
	}

	/// Replaces the title. Returns `None` when the value is unchanged.
	pub fn set_title(&mut self, title: impl Into<String>, origin: EditOrigin) -> Option<EditNotice> {
		let title = title.into();
		if self.present.title == title {
			return None;
		}
		let pre_edit = self.present.clone();
		self.present.title = title;
		Some(self.notice(pre_edit, origin))
	}

	/// Replaces the content. Returns `None` when the value is unchanged.
	pub fn set_content(&mut self, content: impl Into<String>, origin: EditOrigin) -> Option<EditNotice> {
		let content = content.into();
		if self.present.content == content {
			return None;
		}
		let pre_edit = self.present.clone();
		self.present.content = content;
		Some(self.notice(pre_edit, origin))
	}

	/// Replaces both fields at once.
	pub fn replace_all(&mut self, snapshot: DocumentSnapshot, origin: EditOrigin) -> Option<EditNotice> {
		if self.present == snapshot {
			return None;
		}
		let pre_edit = std::mem::replace(&mut self.present, snapshot);
		Some(self.notice(pre_edit, origin))
	}

	fn notice(&self, pre_edit: DocumentSnapshot, origin: EditOrigin) -> EditNotice {
		trace!(
			origin = origin.as_str(),
			title_len = self.present.title.len(),
			content_len = self.present.content.len(),
			"document mutated"
		);
		EditNotice { pre_edit, origin }
	}
}

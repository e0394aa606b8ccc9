//! JSON-lines action scripts.
//!
//! Each non-blank line not starting with `#` is one action:
//!
//! ```text
//! {"op": "title", "value": "Seagrass"}
//! {"op": "content", "value": "Meadows store carbon."}
//! {"op": "wait", "ms": 600}
//! {"op": "undo"}
//! ```
//!
//! Every action produces one [`Report`] line describing what changed.

use std::time::Duration;

use meadow_composer::{
	BlogSubmission, CheckpointOutcome, ComposerConfig, ComposerError, ComposerEvent, ComposerSession, DocumentSnapshot, ImageRef,
	Submitter,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// One scripted user action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
	Title { value: String },
	Content { value: String },
	Replace { title: String, content: String },
	Image {
		file_name: String,
		#[serde(default)]
		byte_len: u64,
	},
	ClearImage,
	/// Sleep, then apply whatever became due.
	Wait { ms: u64 },
	/// Run until no burst is armed and no rewrite is in flight.
	Settle,
	Flush,
	Undo,
	Redo,
	Clear,
	Rewrite,
	Submit,
	Discard,
}

impl Action {
	pub const fn name(&self) -> &'static str {
		match self {
			Self::Title { .. } => "title",
			Self::Content { .. } => "content",
			Self::Replace { .. } => "replace",
			Self::Image { .. } => "image",
			Self::ClearImage => "clear_image",
			Self::Wait { .. } => "wait",
			Self::Settle => "settle",
			Self::Flush => "flush",
			Self::Undo => "undo",
			Self::Redo => "redo",
			Self::Clear => "clear",
			Self::Rewrite => "rewrite",
			Self::Submit => "submit",
			Self::Discard => "discard",
		}
	}
}

/// Script decoding failure.
#[derive(Debug, Error)]
#[error("line {line}: {error}")]
pub struct ScriptError {
	pub line: usize,
	pub error: serde_json::Error,
}

/// Action tagged with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
	pub line: usize,
	pub action: Action,
}

/// Decodes a whole script, failing on the first bad line.
pub fn parse_script(text: &str) -> Result<Vec<Step>, ScriptError> {
	text.lines()
		.enumerate()
		.map(|(idx, raw)| (idx + 1, raw.trim()))
		.filter(|(_, raw)| !raw.is_empty() && !raw.starts_with('#'))
		.map(|(line, raw)| {
			serde_json::from_str(raw)
				.map(|action| Step { line, action })
				.map_err(|error| ScriptError { line, error })
		})
		.collect()
}

/// Adjusts composer settings to the rewrite service actually available.
///
/// The submit-time topic check needs a live service. Without one every
/// submit would fail, so the check is switched off.
pub fn session_config(mut config: ComposerConfig, service_available: bool) -> ComposerConfig {
	if !service_available && config.verify_topic_on_submit {
		warn!("no rewrite service, submit topic check disabled");
		config.verify_topic_on_submit = false;
	}
	config
}

/// Session activity observed while running one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventReport {
	Checkpointed { recorded: bool, evicted: bool },
	RewriteStarted { ticket: u64 },
	RewriteApplied {
		ticket: u64,
		checkpointed: bool,
		#[serde(skip_serializing_if = "Option::is_none")]
		short_description: Option<String>,
	},
	RewriteFailed { ticket: u64, code: &'static str, message: String },
}

impl From<ComposerEvent> for EventReport {
	fn from(event: ComposerEvent) -> Self {
		match event {
			ComposerEvent::Checkpointed(CheckpointOutcome::Recorded { evicted }) => Self::Checkpointed { recorded: true, evicted },
			ComposerEvent::Checkpointed(CheckpointOutcome::Duplicate) => Self::Checkpointed {
				recorded: false,
				evicted: false,
			},
			ComposerEvent::RewriteApplied {
				ticket,
				checkpointed,
				short_description,
			} => Self::RewriteApplied {
				ticket: ticket.token(),
				checkpointed,
				short_description,
			},
			ComposerEvent::RewriteFailed { ticket, error } => Self::RewriteFailed {
				ticket: ticket.token(),
				code: error.code(),
				message: error.to_string(),
			},
		}
	}
}

/// Rejected operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
	pub code: &'static str,
	pub message: String,
}

impl From<ComposerError> for ErrorReport {
	fn from(error: ComposerError) -> Self {
		Self {
			code: error.code(),
			message: error.to_string(),
		}
	}
}

/// Outcome of one step, printed as a JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
	pub line: usize,
	pub op: &'static str,
	/// Whether the present snapshot differs from before the step.
	pub changed: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorReport>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub events: Vec<EventReport>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub submitted: Option<BlogSubmission>,
	pub present: DocumentSnapshot,
	pub undo_len: usize,
	pub redo_len: usize,
}

/// Drives a session through a script.
pub struct Runner<'a> {
	session: ComposerSession,
	submitter: &'a dyn Submitter,
}

impl<'a> Runner<'a> {
	pub fn new(session: ComposerSession, submitter: &'a dyn Submitter) -> Self {
		Self { session, submitter }
	}

	pub fn session(&self) -> &ComposerSession {
		&self.session
	}

	/// Applies one step and reports its effect.
	pub async fn step(&mut self, step: Step) -> Report {
		let before = self.session.present().clone();
		let op = step.action.name();
		let mut events = Vec::new();
		let mut error = None;
		let mut submitted = None;

		debug!(line = step.line, op, "script step");
		match step.action {
			Action::Title { value } => self.session.set_title(value),
			Action::Content { value } => self.session.set_content(value),
			Action::Replace { title, content } => self.session.replace_all(DocumentSnapshot::new(title, content)),
			Action::Image { file_name, byte_len } => self.session.set_image(ImageRef::new(file_name, byte_len)),
			Action::ClearImage => self.session.clear_image(),
			Action::Wait { ms } => {
				tokio::time::sleep(Duration::from_millis(ms)).await;
				events.extend(self.session.pump(Instant::now()).into_iter().map(EventReport::from));
			}
			Action::Settle => {
				while let Some(event) = self.session.next_event().await {
					events.push(event.into());
				}
			}
			Action::Flush => {
				if let Some(outcome) = self.session.flush() {
					events.push(ComposerEvent::Checkpointed(outcome).into());
				}
			}
			Action::Undo => {
				self.session.undo();
			}
			Action::Redo => {
				self.session.redo();
			}
			Action::Clear => {
				self.session.clear_document();
			}
			Action::Rewrite => match self.session.request_rewrite() {
				Ok(ticket) => events.push(EventReport::RewriteStarted { ticket: ticket.token() }),
				Err(err) => error = Some(err.into()),
			},
			Action::Submit => match self.session.submit(self.submitter).await {
				Ok(receipt) => submitted = Some(receipt.submission),
				Err(err) => error = Some(err.into()),
			},
			Action::Discard => self.session.discard(),
		}

		let present = self.session.present().clone();
		let history = self.session.history();
		let report = Report {
			line: step.line,
			op,
			changed: present != before,
			error,
			events,
			submitted,
			undo_len: history.undo_len(),
			redo_len: history.redo_len(),
			present,
		};
		trace!(?report, "step report");
		report
	}

	/// Closes the session, returning the final draft.
	pub fn finish(self) -> DocumentSnapshot {
		self.session.close()
	}
}

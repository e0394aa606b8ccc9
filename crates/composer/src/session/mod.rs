//! Per-session owner of document, history, coalescer, and rewrite bridge.
//!
//! [`ComposerSession`] is the only thing that mutates composer state. Input
//! handlers call its imperative API directly (`set_title`, `undo`, ...), and
//! asynchronous completions arrive through its message queue and are applied
//! on the session's own turn via [`ComposerSession::pump`] or
//! [`ComposerSession::next_event`].
//!
//! # Architecture
//!
//! ```text
//! input handlers ──► ComposerSession ◄── ComposerMsg ◄── rewrite task
//!                    ├── DocumentModel (present)
//!                    ├── Coalescer     (pending burst)
//!                    ├── History       (past / future)
//!                    └── RewriteBridge (in-flight call)
//! ```
//!
//! Dropping or [closing](ComposerSession::close) the session discards any
//! pending burst and cancels the in-flight rewrite; a late completion has no
//! receiver and is dropped.

use std::sync::Arc;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::bridge::{RewriteBridge, RewriteCandidate, RewriteCompletion, RewriteTicket};
use crate::coalescer::Coalescer;
use crate::config::{ComposerConfig, EmptyUndoPolicy};
use crate::document::{DocumentModel, EditNotice};
use crate::error::{ComposerError, Result};
use crate::history::{CheckpointOutcome, History};
use crate::msg::{self, ComposerMsg, MsgReceiver, MsgSender};
use crate::service::{RewriteRequest, RewriteService};
use crate::snapshot::{DocumentSnapshot, EditOrigin, HistoryKind};
use crate::submit::{BlogSubmission, ImageRef, SubmitReceipt, Submitter};
use crate::validate::{SubmissionDraft, validate};

/// Something the session did on its own turn.
#[derive(Debug)]
pub enum ComposerEvent {
	/// A coalesced burst reached its quiet period.
	Checkpointed(CheckpointOutcome),
	/// A rewrite was applied as one undo step.
	RewriteApplied {
		ticket: RewriteTicket,
		/// `false` when the candidate equalled the present and nothing changed.
		checkpointed: bool,
		short_description: Option<String>,
	},
	/// A rewrite failed; the present is untouched.
	RewriteFailed { ticket: RewriteTicket, error: ComposerError },
}

/// One blog-composer editing session.
pub struct ComposerSession {
	config: ComposerConfig,
	document: DocumentModel,
	history: History,
	coalescer: Coalescer,
	bridge: RewriteBridge,
	image: Option<ImageRef>,
	short_description: Option<String>,
	msg_tx: MsgSender,
	msg_rx: MsgReceiver,
}

impl std::fmt::Debug for ComposerSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ComposerSession")
			.field("present", self.document.present())
			.field("history", &self.history)
			.field("coalescer", &self.coalescer)
			.field("bridge", &self.bridge)
			.field("image", &self.image)
			.finish()
	}
}

impl ComposerSession {
	/// Opens a session on a blank document.
	pub fn open(config: ComposerConfig, service: Arc<dyn RewriteService>) -> Self {
		Self::with_snapshot(config, service, DocumentSnapshot::empty())
	}

	/// Opens a session on an existing draft.
	pub fn with_snapshot(config: ComposerConfig, service: Arc<dyn RewriteService>, initial: DocumentSnapshot) -> Self {
		let (msg_tx, msg_rx) = msg::channel();
		let session = Self {
			history: History::new(config.history_capacity),
			coalescer: Coalescer::new(config.debounce()),
			document: DocumentModel::new(initial),
			bridge: RewriteBridge::new(service),
			image: None,
			short_description: None,
			msg_tx,
			msg_rx,
			config,
		};
		debug!(
			capacity = session.history.capacity(),
			quiet_period = ?session.coalescer.quiet_period(),
			"composer session opened"
		);
		session
	}

	pub fn config(&self) -> &ComposerConfig {
		&self.config
	}

	/// The live snapshot.
	pub fn present(&self) -> &DocumentSnapshot {
		self.document.present()
	}

	pub fn history(&self) -> &History {
		&self.history
	}

	pub fn image(&self) -> Option<&ImageRef> {
		self.image.as_ref()
	}

	pub fn short_description(&self) -> Option<&str> {
		self.short_description.as_deref()
	}

	/// Returns `true` while a coalesced burst awaits its quiet period.
	pub fn has_pending_edits(&self) -> bool {
		self.coalescer.is_armed()
	}

	/// When the pending burst will be checkpointed, if one is armed.
	pub fn pending_deadline(&self) -> Option<Instant> {
		self.coalescer.deadline()
	}

	pub fn is_rewrite_pending(&self) -> bool {
		self.bridge.is_busy()
	}

	/// Whether an undo would do anything under the configured policy.
	pub fn can_undo(&self) -> bool {
		self.history.can_undo()
			|| self.coalescer.is_armed()
			|| (self.config.empty_undo == EmptyUndoPolicy::ClearDocument && !self.present().is_empty())
	}

	pub fn can_redo(&self) -> bool {
		self.history.can_redo()
	}

	pub fn set_title(&mut self, title: impl Into<String>) {
		let notice = self.document.set_title(title, EditOrigin::User);
		self.observe(notice);
	}

	pub fn set_content(&mut self, content: impl Into<String>) {
		let notice = self.document.set_content(content, EditOrigin::User);
		self.observe(notice);
	}

	/// Replaces both fields as a single user edit (e.g. paste over the form).
	pub fn replace_all(&mut self, snapshot: DocumentSnapshot) {
		let notice = self.document.replace_all(snapshot, EditOrigin::User);
		self.observe(notice);
	}

	/// Sets the cover image. Not a history step.
	pub fn set_image(&mut self, image: ImageRef) {
		debug!(file = %image.file_name, bytes = image.byte_len, "cover image set");
		self.image = Some(image);
	}

	pub fn clear_image(&mut self) {
		self.image = None;
	}

	/// Commits the pending burst now instead of waiting for its quiet period.
	pub fn flush(&mut self) -> Option<CheckpointOutcome> {
		let snapshot = self.coalescer.flush(self.document.present())?;
		Some(self.history.checkpoint(snapshot))
	}

	/// Steps back one checkpoint. Returns `false` if nothing changed.
	///
	/// A burst still inside its quiet period is committed first, so it is
	/// undone as its own step.
	pub fn undo(&mut self) -> bool {
		self.flush();
		let Some(previous) = self.history.undo(self.document.present(), self.config.empty_undo) else {
			return false;
		};
		self.write(previous, EditOrigin::History(HistoryKind::Undo));
		true
	}

	/// Steps forward one undone checkpoint. Returns `false` if nothing changed.
	pub fn redo(&mut self) -> bool {
		self.flush();
		let Some(next) = self.history.redo(self.document.present()) else {
			return false;
		};
		self.write(next, EditOrigin::History(HistoryKind::Redo));
		true
	}

	/// Blanks the document as one undoable step.
	pub fn clear_document(&mut self) -> bool {
		self.flush();
		if self.document.present().is_empty() {
			return false;
		}
		let present = self.document.present().clone();
		self.history.checkpoint(present);
		self.write(DocumentSnapshot::empty(), EditOrigin::Session);
		true
	}

	/// Sends the present snapshot to the rewrite service.
	///
	/// Returns immediately; the outcome arrives as a [`ComposerEvent`]. Must be
	/// called from within a tokio runtime.
	///
	/// # Errors
	///
	/// [`ComposerError::Busy`] while another rewrite is pending, or
	/// [`ComposerError::Validation`] when title or content is blank.
	pub fn request_rewrite(&mut self) -> Result<RewriteTicket> {
		self.bridge.start(self.document.present(), &self.msg_tx)
	}

	/// Applies queued completions and an expired burst without waiting.
	pub fn pump(&mut self, now: Instant) -> Vec<ComposerEvent> {
		let mut events = Vec::new();
		if let Some(event) = self.fire_due(now) {
			events.push(event);
		}
		while let Ok(msg) = self.msg_rx.try_recv() {
			if let Some(event) = self.apply_msg(msg) {
				events.push(event);
			}
		}
		events
	}

	/// Waits for the next timer expiry or rewrite completion and applies it.
	///
	/// Returns `None` once the session is idle: no burst is armed and no
	/// rewrite is in flight.
	pub async fn next_event(&mut self) -> Option<ComposerEvent> {
		loop {
			if let Some(event) = self.fire_due(Instant::now()) {
				return Some(event);
			}

			let deadline = self.coalescer.deadline();
			if deadline.is_none() && !self.bridge.is_busy() {
				return None;
			}
			let wake_at = deadline.unwrap_or_else(Instant::now);

			tokio::select! {
				msg = self.msg_rx.recv() => {
					let msg = msg?;
					if let Some(event) = self.apply_msg(msg) {
						return Some(event);
					}
				}
				_ = sleep_until(wake_at), if deadline.is_some() => {}
			}
		}
	}

	/// Publishes the present draft through `submitter`.
	///
	/// On success history, document, image and description are reset. On any
	/// failure the session is left exactly as it was (apart from committing the
	/// pending burst), so a retry loses nothing.
	///
	/// # Errors
	///
	/// [`ComposerError::Busy`] while a rewrite is pending,
	/// [`ComposerError::Validation`] for violated rules, rewrite-service errors
	/// from the topic check, or [`ComposerError::Submit`].
	pub async fn submit(&mut self, submitter: &dyn Submitter) -> Result<SubmitReceipt> {
		self.flush();
		if self.bridge.is_busy() {
			return Err(ComposerError::Busy);
		}

		let present = self.document.present().clone();
		let violations = validate(
			SubmissionDraft {
				title: &present.title,
				content: &present.content,
				has_image: self.image.is_some(),
			},
			self.config.require_image,
		);
		if !violations.is_empty() {
			debug!(%violations, "submit refused");
			return Err(ComposerError::Validation(violations));
		}

		if self.config.verify_topic_on_submit {
			let verdict = self.bridge.service().call(RewriteRequest::validate(present.content.clone())).await?;
			if !verdict.is_on_topic {
				warn!(reason = %verdict.rejection_reason, "submit refused: off-topic");
				return Err(ComposerError::RewriteRejected {
					reason: verdict.rejection_reason,
				});
			}
		}

		let submission = BlogSubmission {
			title: present.title,
			content: present.content,
			image: self.image.clone(),
			short_description: self.short_description.clone(),
		};
		if let Err(error) = submitter.submit(&submission).await {
			warn!(%error, "submit collaborator failed");
			return Err(error.into());
		}

		info!(title = %submission.title, "blog post submitted");
		self.reset();
		Ok(SubmitReceipt { submission })
	}

	/// Throws the draft away: document, history, image, description, pending
	/// burst and in-flight rewrite.
	pub fn discard(&mut self) {
		self.bridge.cancel();
		self.reset();
		debug!("composer draft discarded");
	}

	/// Ends the session, returning the final snapshot.
	///
	/// A pending burst is dropped silently and the in-flight rewrite, if any,
	/// is cancelled.
	pub fn close(mut self) -> DocumentSnapshot {
		self.coalescer.cancel();
		self.bridge.cancel();
		debug!("composer session closed");
		self.document.present().clone()
	}

	fn observe(&mut self, notice: Option<EditNotice>) {
		if let Some(notice) = notice
			&& notice.origin.is_user()
		{
			self.coalescer.on_edit(notice.pre_edit, Instant::now());
		}
	}

	/// Writes a snapshot produced by the session itself.
	///
	/// These writes are never fed back into the coalescer.
	fn write(&mut self, snapshot: DocumentSnapshot, origin: EditOrigin) {
		debug_assert!(!origin.is_user());
		let notice = self.document.replace_all(snapshot, origin);
		self.observe(notice);
	}

	fn fire_due(&mut self, now: Instant) -> Option<ComposerEvent> {
		let snapshot = self.coalescer.take_due(now, self.document.present())?;
		Some(ComposerEvent::Checkpointed(self.history.checkpoint(snapshot)))
	}

	fn apply_msg(&mut self, msg: ComposerMsg) -> Option<ComposerEvent> {
		match msg {
			ComposerMsg::RewriteDone(done) => {
				let RewriteCompletion { ticket, verdict } = self.bridge.complete(done)?;
				Some(match verdict {
					Ok(candidate) => self.apply_rewrite(ticket, candidate),
					Err(error) => ComposerEvent::RewriteFailed { ticket, error },
				})
			}
		}
	}

	fn apply_rewrite(&mut self, ticket: RewriteTicket, candidate: RewriteCandidate) -> ComposerEvent {
		self.flush();

		let present = self.document.present().clone();
		let next = candidate.resolve(&present);
		let checkpointed = next != present;
		if checkpointed {
			self.history.checkpoint(present);
			self.write(next, EditOrigin::Rewrite);
		}
		// An accepted rewrite always replaces the description, blank included.
		self.short_description = candidate.short_description.clone();

		debug!(token = ticket.token(), checkpointed, "rewrite applied");
		ComposerEvent::RewriteApplied {
			ticket,
			checkpointed,
			short_description: candidate.short_description,
		}
	}

	fn reset(&mut self) {
		self.coalescer.cancel();
		self.history.clear();
		self.write(DocumentSnapshot::empty(), EditOrigin::Session);
		self.image = None;
		self.short_description = None;
	}
}

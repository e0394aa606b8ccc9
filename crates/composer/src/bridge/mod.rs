//! Single-flight bridge to the rewrite service.
//!
//! A rewrite is requested with the present snapshot, runs on a spawned task,
//! and reports back through the session's message queue. The bridge tracks
//! at most one in-flight call per session; a second request while one is
//! pending is refused with [`ComposerError::Busy`] so two pre-rewrite
//! checkpoints can never compete.
//!
//! Completions are matched by token. A completion whose token is not the
//! in-flight one (cancelled by discard, or replaced) is stale and ignored.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ComposerError, Result};
use crate::msg::{MsgSender, RewriteDoneMsg};
use crate::service::{RewriteRequest, RewriteResponse, RewriteService};
use crate::snapshot::DocumentSnapshot;
use crate::validate::{SubmissionDraft, validate};

/// Handle identifying one rewrite request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RewriteTicket(u64);

impl RewriteTicket {
	pub const fn token(self) -> u64 {
		self.0
	}
}

/// Accepted rewrite, resolved against the present at apply time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteCandidate {
	title: Option<String>,
	content: Option<String>,
	pub short_description: Option<String>,
}

impl RewriteCandidate {
	fn from_response(response: RewriteResponse) -> Self {
		let non_empty = |s: String| (!s.trim().is_empty()).then_some(s);
		Self {
			title: non_empty(response.title),
			content: non_empty(response.rewritten_text),
			short_description: non_empty(response.short_description),
		}
	}

	/// Builds the replacement snapshot, keeping present fields the service left blank.
	pub fn resolve(&self, present: &DocumentSnapshot) -> DocumentSnapshot {
		DocumentSnapshot {
			title: self.title.clone().unwrap_or_else(|| present.title.clone()),
			content: self.content.clone().unwrap_or_else(|| present.content.clone()),
		}
	}
}

/// Outcome of a matched completion.
#[derive(Debug)]
pub struct RewriteCompletion {
	pub ticket: RewriteTicket,
	pub verdict: Result<RewriteCandidate>,
}

#[derive(Debug)]
struct InFlightRewrite {
	token: u64,
	cancel: CancellationToken,
}

/// Tracks the rewrite call for one session.
pub struct RewriteBridge {
	service: Arc<dyn RewriteService>,
	in_flight: Option<InFlightRewrite>,
	next_token: u64,
}

impl std::fmt::Debug for RewriteBridge {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RewriteBridge")
			.field("in_flight", &self.in_flight)
			.field("next_token", &self.next_token)
			.finish()
	}
}

impl RewriteBridge {
	pub fn new(service: Arc<dyn RewriteService>) -> Self {
		Self {
			service,
			in_flight: None,
			next_token: 0,
		}
	}

	/// Shared handle to the underlying service.
	pub fn service(&self) -> Arc<dyn RewriteService> {
		Arc::clone(&self.service)
	}

	pub fn is_busy(&self) -> bool {
		self.in_flight.is_some()
	}

	pub fn in_flight_ticket(&self) -> Option<RewriteTicket> {
		self.in_flight.as_ref().map(|f| RewriteTicket(f.token))
	}

	/// Starts a rewrite of `subject`, reporting completion on `msg_tx`.
	///
	/// Must be called from within a tokio runtime.
	///
	/// # Errors
	///
	/// [`ComposerError::Busy`] if a call is already pending, or
	/// [`ComposerError::Validation`] if the title or content is blank.
	pub fn start(&mut self, subject: &DocumentSnapshot, msg_tx: &MsgSender) -> Result<RewriteTicket> {
		if let Some(pending) = &self.in_flight {
			debug!(pending = pending.token, "rewrite refused: busy");
			return Err(ComposerError::Busy);
		}

		let violations = validate(
			SubmissionDraft {
				title: &subject.title,
				content: &subject.content,
				has_image: false,
			},
			false,
		);
		if !violations.is_empty() {
			return Err(ComposerError::Validation(violations));
		}

		self.next_token += 1;
		let token = self.next_token;
		let cancel = CancellationToken::new();
		self.in_flight = Some(InFlightRewrite {
			token,
			cancel: cancel.clone(),
		});

		let service = Arc::clone(&self.service);
		let request = RewriteRequest::rewrite(subject.content.clone());
		let tx = msg_tx.clone();
		debug!(token, content_len = subject.content.len(), "rewrite started");

		tokio::spawn(async move {
			let result = tokio::select! {
				_ = cancel.cancelled() => {
					debug!(token, "rewrite cancelled before completion");
					return;
				}
				result = service.call(request) => result,
			};
			if tx.send(RewriteDoneMsg { token, result }.into()).is_err() {
				debug!(token, "rewrite completion dropped: session closed");
			}
		});

		Ok(RewriteTicket(token))
	}

	/// Matches a completion against the in-flight call.
	///
	/// Returns `None` for stale completions.
	pub fn complete(&mut self, msg: RewriteDoneMsg) -> Option<RewriteCompletion> {
		if self.in_flight.as_ref().map(|f| f.token) != Some(msg.token) {
			debug!(token = msg.token, "stale rewrite completion ignored");
			return None;
		}
		self.in_flight = None;
		let ticket = RewriteTicket(msg.token);

		let verdict = match msg.result {
			Ok(response) if response.is_on_topic => Ok(RewriteCandidate::from_response(response)),
			Ok(response) => {
				warn!(token = msg.token, reason = %response.rejection_reason, "rewrite rejected as off-topic");
				Err(ComposerError::RewriteRejected {
					reason: response.rejection_reason,
				})
			}
			Err(error) => {
				warn!(token = msg.token, %error, "rewrite service failed");
				Err(ComposerError::RewriteService(error))
			}
		};

		Some(RewriteCompletion { ticket, verdict })
	}

	/// Cancels the in-flight call, if any. Its completion will be stale.
	pub fn cancel(&mut self) {
		if let Some(pending) = self.in_flight.take() {
			debug!(token = pending.token, "rewrite cancelled");
			pending.cancel.cancel();
		}
	}
}

impl Drop for RewriteBridge {
	fn drop(&mut self) {
		self.cancel();
	}
}

#[cfg(test)]
mod tests;

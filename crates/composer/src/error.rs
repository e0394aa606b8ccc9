//! Composer error types.

use thiserror::Error;

use crate::service::ServiceError;
use crate::submit::SubmitError;
use crate::validate::Violations;

/// Errors surfaced by [`ComposerSession`](crate::ComposerSession) operations.
///
/// None of these are fatal. The present snapshot and history are unchanged
/// whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposerError {
	/// Submission or rewrite preconditions failed.
	#[error("validation failed: {0}")]
	Validation(Violations),

	/// The rewrite service could not be reached or answered garbage.
	#[error("rewrite service error: {0}")]
	RewriteService(#[from] ServiceError),

	/// The rewrite service judged the content off-topic.
	#[error("content rejected as off-topic: {reason}")]
	RewriteRejected {
		/// Explanation supplied by the service, possibly empty.
		reason: String,
	},

	/// A rewrite is already in flight for this session.
	#[error("a rewrite is already in progress")]
	Busy,

	/// The submit collaborator refused the post.
	#[error(transparent)]
	Submit(#[from] SubmitError),
}

impl ComposerError {
	/// Stable status code for callers that map failures to UI messages.
	pub const fn code(&self) -> &'static str {
		match self {
			Self::Validation(_) => "validation_error",
			Self::RewriteService(_) => "transport_error",
			Self::RewriteRejected { .. } => "rejected_off_topic",
			Self::Busy => "busy",
			Self::Submit(_) => "submit_failed",
		}
	}
}

/// Result type for composer operations.
pub type Result<T> = std::result::Result<T, ComposerError>;

//! Message queue between background tasks and the owning session.
//!
//! The rewrite task never touches session state. It sends a [`ComposerMsg`]
//! that the session drains on its own turn, so checkpoint writes and user
//! edits are serialized through one owner.
//!
//! ```text
//! rewrite task ──► ComposerMsg ──► drain ──► ComposerSession state update
//! ```

use tokio::sync::mpsc;

use crate::service::{RewriteResponse, ServiceError};

/// Channel sender for background tasks.
pub type MsgSender = mpsc::UnboundedSender<ComposerMsg>;

/// Channel receiver owned by the session.
pub type MsgReceiver = mpsc::UnboundedReceiver<ComposerMsg>;

/// Creates a new message channel pair.
pub fn channel() -> (MsgSender, MsgReceiver) {
	mpsc::unbounded_channel()
}

/// Result of a completed rewrite-service call.
#[derive(Debug)]
pub struct RewriteDoneMsg {
	/// Matches the token handed out by the request.
	pub token: u64,
	pub result: Result<RewriteResponse, ServiceError>,
}

/// Top-level message enum drained by the session.
#[derive(Debug)]
pub enum ComposerMsg {
	RewriteDone(RewriteDoneMsg),
}

impl From<RewriteDoneMsg> for ComposerMsg {
	fn from(msg: RewriteDoneMsg) -> Self {
		Self::RewriteDone(msg)
	}
}

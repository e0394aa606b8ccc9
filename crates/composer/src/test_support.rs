//! Scripted collaborators shared by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::service::{RewriteRequest, RewriteResponse, RewriteService, ServiceError};
use crate::submit::{BlogSubmission, SubmitError, Submitter};

pub(crate) type Reply = Result<RewriteResponse, ServiceError>;

/// Rewrite service whose answers are pushed by the test.
///
/// Each call waits for the next reply on the script channel, so a test can
/// hold a rewrite in flight for as long as it likes.
pub(crate) struct ScriptedService {
	replies: tokio::sync::Mutex<mpsc::UnboundedReceiver<Reply>>,
	calls: Mutex<Vec<RewriteRequest>>,
}

impl ScriptedService {
	pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedSender<Reply>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let service = Arc::new(Self {
			replies: tokio::sync::Mutex::new(rx),
			calls: Mutex::new(Vec::new()),
		});
		(service, tx)
	}

	pub(crate) fn calls(&self) -> Vec<RewriteRequest> {
		self.calls.lock().expect("calls lock").clone()
	}
}

#[async_trait]
impl RewriteService for ScriptedService {
	async fn call(&self, request: RewriteRequest) -> Result<RewriteResponse, ServiceError> {
		self.calls.lock().expect("calls lock").push(request);
		let mut replies = self.replies.lock().await;
		replies
			.recv()
			.await
			.unwrap_or_else(|| Err(ServiceError::Transport("script exhausted".into())))
	}
}

pub(crate) fn on_topic(title: &str, content: &str, description: &str) -> Reply {
	Ok(RewriteResponse {
		rewritten_text: content.into(),
		short_description: description.into(),
		title: title.into(),
		is_on_topic: true,
		rejection_reason: String::new(),
	})
}

pub(crate) fn off_topic(reason: &str) -> Reply {
	Ok(RewriteResponse {
		is_on_topic: false,
		rejection_reason: reason.into(),
		..RewriteResponse::default()
	})
}

/// Submitter that records posts and answers with a fixed outcome.
pub(crate) struct RecordingSubmitter {
	accept: bool,
	pub(crate) posts: Mutex<Vec<BlogSubmission>>,
}

impl RecordingSubmitter {
	pub(crate) fn accepting() -> Self {
		Self {
			accept: true,
			posts: Mutex::new(Vec::new()),
		}
	}

	pub(crate) fn failing() -> Self {
		Self {
			accept: false,
			posts: Mutex::new(Vec::new()),
		}
	}

	pub(crate) fn post_count(&self) -> usize {
		self.posts.lock().expect("posts lock").len()
	}
}

#[async_trait]
impl Submitter for RecordingSubmitter {
	async fn submit(&self, submission: &BlogSubmission) -> Result<(), SubmitError> {
		self.posts.lock().expect("posts lock").push(submission.clone());
		if self.accept {
			Ok(())
		} else {
			Err(SubmitError("backend unavailable".into()))
		}
	}
}

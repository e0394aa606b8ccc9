//! Hand-off types for the external submit collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cover image chosen through the image picker.
///
/// The composer treats the image as opaque; it only needs to know one is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
	pub file_name: String,
	pub byte_len: u64,
}

impl ImageRef {
	pub fn new(file_name: impl Into<String>, byte_len: u64) -> Self {
		Self {
			file_name: file_name.into(),
			byte_len,
		}
	}
}

/// Validated post handed to the [`Submitter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogSubmission {
	pub title: String,
	pub content: String,
	pub image: Option<ImageRef>,
	pub short_description: Option<String>,
}

/// Failure reported by the submit collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("submission failed: {0}")]
pub struct SubmitError(pub String);

/// Receipt for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
	pub submission: BlogSubmission,
}

/// Backend that publishes a finished post.
#[async_trait]
pub trait Submitter: Send + Sync {
	async fn submit(&self, submission: &BlogSubmission) -> Result<(), SubmitError>;
}

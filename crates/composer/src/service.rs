//! Rewrite-service contract.
//!
//! The composer only knows the request/response shapes below. Concrete HTTP
//! clients live in `meadow-rewrite`; tests plug in scripted fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the service is asked to do with the subject text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
	/// Improve the text and judge whether it is on topic.
	#[serde(rename = "rewrite+validate")]
	RewriteAndValidate,
	/// Only judge whether the text is on topic.
	#[serde(rename = "validate")]
	Validate,
}

impl Instruction {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::RewriteAndValidate => "rewrite+validate",
			Self::Validate => "validate",
		}
	}
}

/// Request sent to the rewrite service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
	pub instruction: Instruction,
	pub subject_text: String,
}

impl RewriteRequest {
	pub fn rewrite(subject_text: impl Into<String>) -> Self {
		Self {
			instruction: Instruction::RewriteAndValidate,
			subject_text: subject_text.into(),
		}
	}

	pub fn validate(subject_text: impl Into<String>) -> Self {
		Self {
			instruction: Instruction::Validate,
			subject_text: subject_text.into(),
		}
	}
}

/// Response from the rewrite service.
///
/// For [`Instruction::Validate`] only the verdict fields are meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewriteResponse {
	pub rewritten_text: String,
	pub short_description: String,
	/// Suggested title; empty keeps the current one.
	pub title: String,
	pub is_on_topic: bool,
	pub rejection_reason: String,
}

/// Transport-level failure talking to the rewrite service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
	/// Request could not be sent or the connection failed.
	#[error("transport failure: {0}")]
	Transport(String),
	/// Service answered with a non-success status.
	#[error("service returned status {status}: {body}")]
	Status { status: u16, body: String },
	/// Response body was not the expected JSON.
	#[error("malformed response: {0}")]
	Parse(String),
}

/// External text-improvement collaborator.
#[async_trait]
pub trait RewriteService: Send + Sync + 'static {
	/// Sends one request and waits for the verdict.
	async fn call(&self, request: RewriteRequest) -> Result<RewriteResponse, ServiceError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_uses_wire_field_names() {
		let json = serde_json::to_value(RewriteRequest::rewrite("seagrass meadows")).expect("serializable");

		assert_eq!(
			json,
			serde_json::json!({
				"instruction": "rewrite+validate",
				"subjectText": "seagrass meadows",
			})
		);
	}

	#[test]
	fn response_tolerates_missing_optional_fields() {
		let response: RewriteResponse = serde_json::from_str(r#"{"rewrittenText":"better","isOnTopic":true}"#).expect("valid response");

		assert_eq!(response.rewritten_text, "better");
		assert!(response.is_on_topic);
		assert!(response.title.is_empty());
		assert!(response.short_description.is_empty());
	}
}

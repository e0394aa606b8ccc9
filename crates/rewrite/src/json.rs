//! Client for endpoints that speak the composer's own request/response JSON.

use std::time::Duration;

use async_trait::async_trait;
use meadow_composer::{RewriteRequest, RewriteResponse, RewriteService, ServiceError};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

/// Posts [`RewriteRequest`] verbatim and expects a [`RewriteResponse`] body.
#[derive(Debug, Clone)]
pub struct JsonRewriter {
	client: Client,
	endpoint: String,
	api_key: Option<String>,
	timeout: Duration,
}

impl JsonRewriter {
	pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
		Self {
			client: Client::new(),
			endpoint: endpoint.into(),
			api_key,
			timeout,
		}
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

#[async_trait]
impl RewriteService for JsonRewriter {
	async fn call(&self, request: RewriteRequest) -> Result<RewriteResponse, ServiceError> {
		debug!(endpoint = %self.endpoint, instruction = request.instruction.as_str(), "rewrite request");

		let mut builder = self
			.client
			.post(&self.endpoint)
			.header(CONTENT_TYPE, "application/json")
			.json(&request)
			.timeout(self.timeout);
		if let Some(key) = &self.api_key {
			builder = builder.bearer_auth(key);
		}

		let response = builder.send().await.map_err(|e| ServiceError::Transport(e.to_string()))?;

		let status = response.status();
		let body = response.text().await.map_err(|e| ServiceError::Transport(e.to_string()))?;
		if !status.is_success() {
			return Err(ServiceError::Status {
				status: status.as_u16(),
				body,
			});
		}

		parse_wire_response(&body)
	}
}

/// Parses a response body in the composer's wire format.
pub fn parse_wire_response(body: &str) -> Result<RewriteResponse, ServiceError> {
	serde_json::from_str(body).map_err(|e| ServiceError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn wire_body_parses() {
		let response = parse_wire_response(
			r#"{
				"rewrittenText": "Seagrass meadows store carbon.",
				"shortDescription": "Blue carbon basics",
				"title": "Blue Carbon",
				"isOnTopic": true,
				"rejectionReason": ""
			}"#,
		)
		.expect("valid body");

		assert_eq!(
			response,
			RewriteResponse {
				rewritten_text: "Seagrass meadows store carbon.".into(),
				short_description: "Blue carbon basics".into(),
				title: "Blue Carbon".into(),
				is_on_topic: true,
				rejection_reason: String::new(),
			}
		);
	}

	#[test]
	fn garbage_is_a_parse_error() {
		let err = parse_wire_response("<html>bad gateway</html>").expect_err("not json");
		assert!(matches!(err, ServiceError::Parse(_)));
	}

	#[tokio::test(flavor = "current_thread")]
	async fn unreachable_endpoint_is_a_transport_error() {
		let rewriter = JsonRewriter::new("http://127.0.0.1:9/rewrite", None, Duration::from_millis(200));
		let err = rewriter.call(RewriteRequest::validate("eelgrass")).await.expect_err("nothing listens on the discard port");
		assert!(matches!(err, ServiceError::Transport(_)));
	}
}

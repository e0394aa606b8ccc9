#![cfg_attr(test, allow(unused_crate_dependencies))]
//! HTTP rewrite clients for the blog composer.
//!
//! [`build_service`] turns a [`RewriteConfig`] into the
//! [`RewriteService`](meadow_composer::RewriteService) the composer session
//! talks to.

use std::sync::Arc;

use async_trait::async_trait;
use meadow_composer::{RewriteRequest, RewriteResponse, RewriteService, ServiceError};
use tracing::{info, warn};

pub mod chat;
pub mod config;
pub mod json;

pub use chat::ChatRewriter;
pub use config::{RewriteConfig, RewriteKind};
pub use json::JsonRewriter;

/// Stand-in used when no endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRewriter;

#[async_trait]
impl RewriteService for DisabledRewriter {
	async fn call(&self, _request: RewriteRequest) -> Result<RewriteResponse, ServiceError> {
		Err(ServiceError::Transport("rewrite service is not configured".into()))
	}
}

/// Builds the service described by `config`.
///
/// A non-disabled kind with an empty endpoint falls back to [`DisabledRewriter`].
pub fn build_service(config: &RewriteConfig) -> Arc<dyn RewriteService> {
	if !config.is_enabled() {
		if config.kind != RewriteKind::Disabled {
			warn!(kind = ?config.kind, "rewrite endpoint missing, service disabled");
		}
		return Arc::new(DisabledRewriter);
	}
	let endpoint = config.endpoint.trim();

	let api_key = config.api_key();
	if config.api_key_env.is_some() && api_key.is_none() {
		warn!(var = config.api_key_env.as_deref(), "rewrite api key variable is unset");
	}

	match config.kind {
		RewriteKind::Disabled => Arc::new(DisabledRewriter),
		RewriteKind::Json => {
			let rewriter = JsonRewriter::new(endpoint, api_key, config.timeout());
			info!(endpoint = rewriter.endpoint(), "using json rewrite service");
			Arc::new(rewriter)
		}
		RewriteKind::Chat => {
			info!(endpoint, topic = %config.topic, "using chat rewrite service");
			Arc::new(
				ChatRewriter::new(endpoint, api_key, config.topic.clone(), config.timeout())
					.with_sampling(config.max_tokens, config.temperature),
			)
		}
	}
}

//! Rewrite client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which wire protocol the rewrite endpoint speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteKind {
	/// No service configured; every call fails with a transport error.
	#[default]
	Disabled,
	/// Endpoint accepts and returns the composer's request/response JSON.
	Json,
	/// OpenAI-compatible chat-completions endpoint.
	Chat,
}

/// Settings for the rewrite client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
	pub kind: RewriteKind,
	pub endpoint: String,
	/// Environment variable holding the API key. The key itself never lives in config.
	pub api_key_env: Option<String>,
	/// Subject the service judges posts against.
	pub topic: String,
	pub max_tokens: u32,
	pub temperature: f32,
	pub timeout_secs: u64,
}

impl Default for RewriteConfig {
	fn default() -> Self {
		Self {
			kind: RewriteKind::Disabled,
			endpoint: String::new(),
			api_key_env: None,
			topic: "seagrass ecosystems".to_string(),
			max_tokens: 3000,
			temperature: 0.7,
			timeout_secs: 60,
		}
	}
}

impl RewriteConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	/// Whether a real service is configured.
	pub fn is_enabled(&self) -> bool {
		self.kind != RewriteKind::Disabled && !self.endpoint.trim().is_empty()
	}

	/// Reads the API key from the configured environment variable.
	pub fn api_key(&self) -> Option<String> {
		let var = self.api_key_env.as_deref()?;
		std::env::var(var).ok().filter(|key| !key.is_empty())
	}
}

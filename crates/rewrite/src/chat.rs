//! Client for OpenAI-compatible chat-completions endpoints.
//!
//! The model is prompted to answer with a small JSON verdict, which is then
//! mapped onto the composer's [`RewriteResponse`].

use std::time::Duration;

use async_trait::async_trait;
use meadow_composer::{Instruction, RewriteRequest, RewriteResponse, RewriteService, ServiceError};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Sampling limits for topic-only checks.
const VALIDATE_MAX_TOKENS: u32 = 300;
const VALIDATE_TEMPERATURE: f32 = 0.0;

/// Chat-completions backed rewriter.
#[derive(Debug, Clone)]
pub struct ChatRewriter {
	client: Client,
	endpoint: String,
	api_key: Option<String>,
	topic: String,
	max_tokens: u32,
	temperature: f32,
	timeout: Duration,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
	role: &'static str,
	content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
	messages: [ChatMessage<'a>; 1],
	max_tokens: u32,
	temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletion {
	#[serde(default)]
	choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
	message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
	#[serde(default)]
	content: Option<String>,
}

/// Verdict object the model is asked to return.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatVerdict {
	optimized_content: String,
	meta_description: String,
	title: String,
	#[serde(alias = "is_seagrass_related")]
	is_on_topic: bool,
	reason: String,
}

impl From<ChatVerdict> for RewriteResponse {
	fn from(verdict: ChatVerdict) -> Self {
		Self {
			rewritten_text: verdict.optimized_content,
			short_description: verdict.meta_description,
			title: verdict.title,
			is_on_topic: verdict.is_on_topic,
			rejection_reason: verdict.reason,
		}
	}
}

impl ChatRewriter {
	pub fn new(endpoint: impl Into<String>, api_key: Option<String>, topic: impl Into<String>, timeout: Duration) -> Self {
		Self {
			client: Client::new(),
			endpoint: endpoint.into(),
			api_key,
			topic: topic.into(),
			max_tokens: 3000,
			temperature: 0.7,
			timeout,
		}
	}

	/// Overrides the sampling limits used for rewrite requests.
	pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
		self.max_tokens = max_tokens;
		self.temperature = temperature;
		self
	}

	fn prompt(&self, request: &RewriteRequest) -> String {
		let topic = &self.topic;
		let text = &request.subject_text;
		match request.instruction {
			Instruction::RewriteAndValidate => format!(
				"You are an expert content writer, SEO specialist, and domain expert in {topic}.\n\
				 Improve the grammar, clarity and readability of the blog post below, optimize it for search \
				 by working relevant keywords in naturally, suggest a meta description and a title, and \
				 confirm whether the article is truly about {topic}.\n\n\
				 Return JSON strictly:\n\
				 {{ \"optimized_content\": \"...\", \"meta_description\": \"...\", \"title\": \"...\", \
				 \"is_on_topic\": true/false, \"reason\": \"short explanation\" }}\n\n\
				 Blog post:\n{text}"
			),
			Instruction::Validate => format!(
				"You are a domain expert in {topic}.\n\
				 Check whether this blog post is about {topic}.\n\
				 Return JSON: {{ \"is_on_topic\": true/false, \"reason\": \"short explanation\" }}\n\n\
				 Blog:\n{text}"
			),
		}
	}

	fn sampling(&self, instruction: Instruction) -> (u32, f32) {
		match instruction {
			Instruction::RewriteAndValidate => (self.max_tokens, self.temperature),
			Instruction::Validate => (VALIDATE_MAX_TOKENS, VALIDATE_TEMPERATURE),
		}
	}
}

#[async_trait]
impl RewriteService for ChatRewriter {
	async fn call(&self, request: RewriteRequest) -> Result<RewriteResponse, ServiceError> {
		let prompt = self.prompt(&request);
		let (max_tokens, temperature) = self.sampling(request.instruction);
		let body = ChatRequest {
			messages: [ChatMessage {
				role: "system",
				content: &prompt,
			}],
			max_tokens,
			temperature,
		};

		debug!(endpoint = %self.endpoint, instruction = request.instruction.as_str(), "chat rewrite request");

		let mut builder = self
			.client
			.post(&self.endpoint)
			.header(CONTENT_TYPE, "application/json")
			.json(&body)
			.timeout(self.timeout);
		if let Some(key) = &self.api_key {
			builder = builder.header("api-key", key);
		}

		let response = builder.send().await.map_err(|e| ServiceError::Transport(e.to_string()))?;

		let status = response.status();
		let text = response.text().await.map_err(|e| ServiceError::Transport(e.to_string()))?;
		if !status.is_success() {
			return Err(ServiceError::Status {
				status: status.as_u16(),
				body: text,
			});
		}

		parse_chat_completion(&text)
	}
}

/// Extracts the verdict from a chat-completions body.
pub fn parse_chat_completion(body: &str) -> Result<RewriteResponse, ServiceError> {
	let completion: ChatCompletion = serde_json::from_str(body).map_err(|e| ServiceError::Parse(e.to_string()))?;
	let content = completion
		.choices
		.into_iter()
		.next()
		.and_then(|choice| choice.message.content)
		.unwrap_or_default();
	trace!(len = content.len(), "chat completion content");

	let verdict: ChatVerdict =
		serde_json::from_str(strip_json_fence(&content)).map_err(|e| ServiceError::Parse(format!("verdict: {e}")))?;
	Ok(verdict.into())
}

/// Removes a surrounding ```` ```json ```` fence if the model added one.
pub fn strip_json_fence(content: &str) -> &str {
	let trimmed = content.trim();
	let Some(start) = trimmed.find("```json") else {
		return trimmed;
	};
	let inner = trimmed[start + "```json".len()..].trim_start();
	inner.strip_suffix("```").map_or(inner, str::trim_end)
}

//! Local stand-in for the publishing backend.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use meadow_composer::{BlogSubmission, SubmitError, Submitter};
use tracing::info;

/// Accepts submissions and optionally writes each one to `dir` as JSON.
#[derive(Debug, Default)]
pub struct Outbox {
	dir: Option<PathBuf>,
	posted: AtomicU64,
}

impl Outbox {
	pub fn new(dir: Option<PathBuf>) -> Self {
		Self {
			dir,
			posted: AtomicU64::new(0),
		}
	}

	pub fn posted(&self) -> u64 {
		self.posted.load(Ordering::Relaxed)
	}
}

#[async_trait]
impl Submitter for Outbox {
	async fn submit(&self, submission: &BlogSubmission) -> Result<(), SubmitError> {
		let seq = self.posted() + 1;
		if let Some(dir) = &self.dir {
			let body = serde_json::to_vec_pretty(submission).map_err(|e| SubmitError(e.to_string()))?;
			tokio::fs::create_dir_all(dir)
				.await
				.map_err(|e| SubmitError(format!("{}: {e}", dir.display())))?;
			let path = dir.join(format!("post-{seq:03}.json"));
			tokio::fs::write(&path, body)
				.await
				.map_err(|e| SubmitError(format!("{}: {e}", path.display())))?;
			info!(path = %path.display(), title = %submission.title, "post written");
		} else {
			info!(title = %submission.title, "post accepted");
		}
		self.posted.store(seq, Ordering::Relaxed);
		Ok(())
	}
}

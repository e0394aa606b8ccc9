//! Quiet-period gate that turns an edit burst into one checkpoint.
//!
//! Every user edit re-arms the timer. Only the snapshot taken before the
//! *first* edit of a burst is retained, so undoing the resulting checkpoint
//! returns to the state the burst started from.
//!
//! The coalescer does not own a timer task. The session polls [`Coalescer::take_due`]
//! with the current time, or sleeps until [`Coalescer::deadline`]. Under a
//! paused tokio clock this makes expiry fully deterministic.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::snapshot::DocumentSnapshot;

/// Default quiet period after the last keystroke.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
struct PendingBurst {
	/// Document state before the burst's first edit.
	burst_start: DocumentSnapshot,
	/// When the most recent edit of the burst occurred.
	last_edit_at: Instant,
	/// Number of edits folded into this burst.
	edits: usize,
}

/// Debounce gate for one session.
#[derive(Debug, Clone)]
pub struct Coalescer {
	quiet_period: Duration,
	pending: Option<PendingBurst>,
}

impl Default for Coalescer {
	fn default() -> Self {
		Self::new(DEFAULT_QUIET_PERIOD)
	}
}

impl Coalescer {
	pub fn new(quiet_period: Duration) -> Self {
		Self {
			quiet_period,
			pending: None,
		}
	}

	pub fn quiet_period(&self) -> Duration {
		self.quiet_period
	}

	/// Returns `true` while a burst is waiting for its quiet period.
	pub fn is_armed(&self) -> bool {
		self.pending.is_some()
	}

	/// Instant at which the pending burst becomes due.
	pub fn deadline(&self) -> Option<Instant> {
		self.pending.as_ref().map(|p| p.last_edit_at + self.quiet_period)
	}

	/// Arms or re-arms the timer for a user edit.
	pub fn on_edit(&mut self, pre_edit: DocumentSnapshot, now: Instant) {
		match &mut self.pending {
			Some(burst) => {
				burst.last_edit_at = now;
				burst.edits += 1;
			}
			None => {
				trace!("coalescer armed");
				self.pending = Some(PendingBurst {
					burst_start: pre_edit,
					last_edit_at: now,
					edits: 1,
				});
			}
		}
	}

	/// Returns `true` if the pending burst's quiet period has elapsed.
	pub fn is_due(&self, now: Instant) -> bool {
		self.deadline().is_some_and(|deadline| now >= deadline)
	}

	/// Disarms and returns the checkpoint to record if the quiet period elapsed.
	///
	/// See [`Coalescer::flush`] for when the burst yields nothing.
	pub fn take_due(&mut self, now: Instant, present: &DocumentSnapshot) -> Option<DocumentSnapshot> {
		if !self.is_due(now) {
			return None;
		}
		self.flush(present)
	}

	/// Disarms immediately, returning the checkpoint to record.
	///
	/// A burst that ended where it started (burst-start equals `present`) is
	/// dropped: it would put a no-op step on the undo stack.
	pub fn flush(&mut self, present: &DocumentSnapshot) -> Option<DocumentSnapshot> {
		let burst = self.pending.take()?;
		if &burst.burst_start == present {
			trace!(edits = burst.edits, "coalescer disarmed: burst was a no-op");
			return None;
		}
		trace!(edits = burst.edits, "coalescer disarmed");
		Some(burst.burst_start)
	}

	/// Discards any pending burst without producing a checkpoint.
	pub fn cancel(&mut self) {
		if let Some(burst) = self.pending.take() {
			trace!(edits = burst.edits, "coalescer cancelled");
		}
	}
}

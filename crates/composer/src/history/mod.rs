//! Bounded snapshot history with undo/redo stacks.
//!
//! [`History`] owns the past and future stacks for one composer session. It
//! never holds the present snapshot: callers pass the present in and receive
//! the snapshot to write back.
//!
//! # Stacks
//!
//! ```text
//! past (oldest first)              present            future (nearest redo first)
//! ┌────┬────┬────┬────┐         ┌─────────┐          ┌────┬────┐
//! │ S0 │ S1 │ S2 │ S3 │ ◄─undo─ │    P    │ ─redo─►  │ F0 │ F1 │
//! └────┴────┴────┴────┘         └─────────┘          └────┴────┘
//! ```
//!
//! Fresh checkpoints append to `past`, evict from its oldest end once
//! `capacity` is exceeded, and clear `future`.

use std::collections::VecDeque;

use tracing::trace;

use crate::config::EmptyUndoPolicy;
use crate::snapshot::DocumentSnapshot;

/// Default number of checkpoints retained on the past stack.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Result of a [`History::checkpoint`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointOutcome {
	/// Snapshot appended to `past`.
	Recorded { evicted: bool },
	/// Snapshot equalled the last `past` entry and was dropped.
	Duplicate,
}

impl CheckpointOutcome {
	pub const fn is_recorded(self) -> bool {
		matches!(self, Self::Recorded { .. })
	}
}

/// Undo/redo stacks for a single editing session.
#[derive(Debug, Clone)]
pub struct History {
	past: VecDeque<DocumentSnapshot>,
	future: VecDeque<DocumentSnapshot>,
	capacity: usize,
}

impl Default for History {
	fn default() -> Self {
		Self::new(DEFAULT_HISTORY_CAPACITY)
	}
}

impl History {
	/// Creates an empty history holding at most `capacity` past entries.
	pub fn new(capacity: usize) -> Self {
		Self {
			past: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
			future: VecDeque::new(),
			capacity,
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn undo_len(&self) -> usize {
		self.past.len()
	}

	pub fn redo_len(&self) -> usize {
		self.future.len()
	}

	pub fn can_undo(&self) -> bool {
		!self.past.is_empty()
	}

	pub fn can_redo(&self) -> bool {
		!self.future.is_empty()
	}

	/// Past entries, oldest first.
	pub fn past(&self) -> impl ExactSizeIterator<Item = &DocumentSnapshot> {
		self.past.iter()
	}

	/// Future entries, nearest redo first.
	pub fn future(&self) -> impl ExactSizeIterator<Item = &DocumentSnapshot> {
		self.future.iter()
	}

	pub fn last_checkpoint(&self) -> Option<&DocumentSnapshot> {
		self.past.back()
	}

	/// Records a state reachable by undo.
	///
	/// Drops the snapshot if it equals the newest `past` entry. Otherwise the
	/// redo stack is cleared since this is a fresh edit.
	pub fn checkpoint(&mut self, snapshot: DocumentSnapshot) -> CheckpointOutcome {
		if self.past.back() == Some(&snapshot) {
			trace!(undo_stack = self.past.len(), "checkpoint dropped: duplicate");
			return CheckpointOutcome::Duplicate;
		}

		self.past.push_back(snapshot);
		let evicted = self.enforce_capacity();

		if !self.future.is_empty() {
			trace!(cleared = self.future.len(), "redo stack cleared");
		}
		self.future.clear();

		trace!(undo_stack = self.past.len(), evicted, "checkpoint recorded");
		CheckpointOutcome::Recorded { evicted }
	}

	/// Steps back one checkpoint.
	///
	/// Returns the snapshot to write into the document, or `None` when there is
	/// nothing to undo. With [`EmptyUndoPolicy::ClearDocument`] an empty past
	/// and non-blank present yield one extra step to the empty document; the
	/// present goes onto the redo stack, so redo brings it back.
	pub fn undo(&mut self, present: &DocumentSnapshot, policy: EmptyUndoPolicy) -> Option<DocumentSnapshot> {
		if let Some(previous) = self.past.pop_back() {
			self.future.push_front(present.clone());
			trace!(
				undo_stack = self.past.len(),
				redo_stack = self.future.len(),
				"undo: popped checkpoint"
			);
			return Some(previous);
		}

		match policy {
			EmptyUndoPolicy::ClearDocument if !present.is_empty() => {
				self.future.push_front(present.clone());
				trace!(redo_stack = self.future.len(), "undo: implicit clear to empty document");
				Some(DocumentSnapshot::empty())
			}
			_ => {
				trace!("undo: nothing to undo");
				None
			}
		}
	}

	/// Steps forward one undone checkpoint.
	pub fn redo(&mut self, present: &DocumentSnapshot) -> Option<DocumentSnapshot> {
		let Some(next) = self.future.pop_front() else {
			trace!("redo: nothing to redo");
			return None;
		};

		self.past.push_back(present.clone());
		self.enforce_capacity();
		trace!(
			undo_stack = self.past.len(),
			redo_stack = self.future.len(),
			"redo: popped future entry"
		);
		Some(next)
	}

	/// Drops both stacks.
	pub fn clear(&mut self) {
		trace!(undo_stack = self.past.len(), redo_stack = self.future.len(), "history cleared");
		self.past.clear();
		self.future.clear();
	}

	fn enforce_capacity(&mut self) -> bool {
		let mut evicted = false;
		while self.past.len() > self.capacity {
			self.past.pop_front();
			evicted = true;
		}
		if evicted {
			trace!(capacity = self.capacity, "oldest checkpoint evicted");
		}
		evicted
	}
}

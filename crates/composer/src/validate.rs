//! Submission preconditions.

use std::fmt;

/// A single submission rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
	TitleRequired,
	ContentRequired,
	ImageRequired,
}

impl Rule {
	pub const fn message(self) -> &'static str {
		match self {
			Self::TitleRequired => "title cannot be empty",
			Self::ContentRequired => "content cannot be empty",
			Self::ImageRequired => "a cover image is required",
		}
	}
}

impl fmt::Display for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.message())
	}
}

/// Fields inspected by [`validate`].
#[derive(Debug, Clone, Copy)]
pub struct SubmissionDraft<'a> {
	pub title: &'a str,
	pub content: &'a str,
	pub has_image: bool,
}

/// Violated rules, in [`Rule`] order. Empty means the draft may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Rule>);

impl Violations {
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn rules(&self) -> &[Rule] {
		&self.0
	}

	pub fn contains(&self, rule: Rule) -> bool {
		self.0.contains(&rule)
	}
}

impl fmt::Display for Violations {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, rule) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str("; ")?;
			}
			fmt::Display::fmt(rule, f)?;
		}
		Ok(())
	}
}

/// Checks a draft against the submission rules.
///
/// Title and content are blank when empty after trimming.
pub fn validate(draft: SubmissionDraft<'_>, require_image: bool) -> Violations {
	let mut violated = Vec::new();
	if draft.title.trim().is_empty() {
		violated.push(Rule::TitleRequired);
	}
	if draft.content.trim().is_empty() {
		violated.push(Rule::ContentRequired);
	}
	if require_image && !draft.has_image {
		violated.push(Rule::ImageRequired);
	}
	Violations(violated)
}

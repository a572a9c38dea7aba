use std::fmt::Display;

use crate::location::CodeLocation;

/// The diagnostics sink.
///
/// Every pass surfaces at most its first error, hands it here, and unwinds;
/// callers read `had_error` to decide the exit status. The label names the
/// source being processed, e.g. a file path or `<REPL>`.
#[derive(Debug)]
pub struct ErrorReporter {
	label:     String,
	had_error: bool,
}

impl ErrorReporter {
	pub fn new(label: impl Into<String>) -> Self { Self { label: label.into(), had_error: false } }

	/// Record an error whose message already carries its location.
	pub fn report(&mut self, message: impl Display) {
		eprintln!("[ERROR] [{}] {message}", self.label);
		self.had_error = true;
	}

	/// Record an error at an explicit location.
	pub fn report_at(&mut self, message: impl Display, location: &CodeLocation) {
		eprintln!("[ERROR] [{}] {message} {location}", self.label);
		self.had_error = true;
	}

	pub fn had_error(&self) -> bool { self.had_error }
}

use crate::location::CodeLocation;

/// A syntax error. The first one encountered aborts the whole parse, so a
/// single value describes everything the parser has to say about a bad
/// token stream.
#[derive(thiserror::Error, Debug)]
#[error("{kind} {location}")]
pub struct ParseError {
	pub location: CodeLocation,
	pub kind:     ParseErrorKind,
}

impl ParseError {
	pub fn new(location: CodeLocation, kind: ParseErrorKind) -> Self { Self { location, kind } }
}

#[derive(Debug)]
pub enum ParseErrorKind {
	/// A specific token was required, e.g. "Expected ')' after expression".
	Expected(&'static str),
	/// No rule matched where an expression had to start.
	ExpectedExpression(String),
	/// The left-hand side of `=` was not a bare variable.
	InvalidAssignmentTarget,
	/// `++`/`--` applied to something other than a bare variable.
	InvalidPostfixTarget,
}

impl std::fmt::Display for ParseErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ParseErrorKind::*;
		match self {
			Expected(what) => write!(f, "{what}"),
			ExpectedExpression(found) => write!(f, "Expected expression, found '{found}'"),
			InvalidAssignmentTarget => write!(f, "Invalid assignment target, expected a variable"),
			InvalidPostfixTarget => write!(f, "Invalid postfix operand, expected a variable"),
		}
	}
}

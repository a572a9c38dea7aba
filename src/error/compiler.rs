use crate::location::CodeLocation;

/// An error raised when the bytecode compiler meets an AST shape it cannot
/// lower. Compilation aborts on the first one.
#[derive(thiserror::Error, Debug)]
#[error("{kind} {location}")]
pub struct CompileError {
	pub location: CodeLocation,
	pub kind:     CompileErrorKind,
}

impl CompileError {
	pub fn new(location: CodeLocation, kind: CompileErrorKind) -> Self { Self { location, kind } }
}

#[derive(Debug)]
pub enum CompileErrorKind {
	/// A node kind the bytecode backend does not lower at all.
	Unsupported(&'static str),
	/// A binary/logical operator token without an opcode.
	UnsupportedOperator(String),
	/// `break` with no enclosing loop.
	BreakOutsideLoop,
}

impl std::fmt::Display for CompileErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use CompileErrorKind::*;
		match self {
			Unsupported(what) => write!(f, "{what} not supported by the bytecode compiler"),
			UnsupportedOperator(op) => write!(f, "Operator {op} is not supported by the bytecode compiler"),
			BreakOutsideLoop => write!(f, "'break' used outside of a loop"),
		}
	}
}

use crate::location::CodeLocation;

/// Errors that can occur while interpreting a program. Each variant carries
/// the source location the interpreter was executing when it failed.
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
	#[error("Variable '{name}' is already defined {location}")]
	AlreadyDefined { name: String, location: CodeLocation },
	#[error("Variable '{name}' is not defined {location}")]
	NotDefined { name: String, location: CodeLocation },
	#[error("Binary operator {operator} for types {left} and {right} is not supported {location}")]
	UnsupportedBinaryOperands { operator: String, left: &'static str, right: &'static str, location: CodeLocation },
	#[error("Can't negate a non-number, got {type_name} {location}")]
	NegateNonNumber { type_name: &'static str, location: CodeLocation },
	#[error("Postfix operator {operator} requires a number variable, got {type_name} {location}")]
	PostfixNonNumber { operator: String, type_name: &'static str, location: CodeLocation },
	#[error("Can only call functions, got {type_name} {location}")]
	NotCallable { type_name: &'static str, location: CodeLocation },
	#[error("Expected {expected} arguments but got {actual} {location}")]
	WrongArity { expected: usize, actual: usize, location: CodeLocation },
	#[error("'break' used outside of a loop {location}")]
	BreakOutsideLoop { location: CodeLocation },
	#[error("'return' used outside of a function {location}")]
	ReturnOutsideFunction { location: CodeLocation },
	#[error("{what} not supported {location}")]
	NotSupported { what: &'static str, location: CodeLocation },
}

/// Errors raised by [`Environment`](crate::environment::Environment)
/// operations. The environment knows only names; the interpreter attaches
/// the token location when converting to a [`RuntimeError`].
#[derive(Debug, PartialEq, Eq)]
pub enum EnvironmentError {
	AlreadyDefined(String),
	NotDefined(String),
}

impl EnvironmentError {
	pub fn at(self, location: CodeLocation) -> RuntimeError {
		match self {
			EnvironmentError::AlreadyDefined(name) => RuntimeError::AlreadyDefined { name, location },
			EnvironmentError::NotDefined(name) => RuntimeError::NotDefined { name, location },
		}
	}
}

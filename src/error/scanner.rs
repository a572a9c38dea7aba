use crate::location::CodeLocation;

/// A lexical error with the location of the offending character.
#[derive(thiserror::Error, Debug)]
#[error("{kind} {location}")]
pub struct ScanError {
	pub location: CodeLocation,
	pub kind:     ScanErrorKind,
}

impl ScanError {
	pub fn new(location: CodeLocation, kind: ScanErrorKind) -> Self { Self { location, kind } }
}

#[derive(Debug)]
pub enum ScanErrorKind {
	UnexpectedCharacter(char),
	UnterminatedString,
	IllegalEscape(char),
	InvalidNumber(String),
}

impl std::fmt::Display for ScanErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ScanErrorKind::*;
		match self {
			UnexpectedCharacter(c) => write!(f, "Unexpected character '{c}'"),
			UnterminatedString => write!(f, "Unterminated string"),
			IllegalEscape(c) => write!(f, "Illegal escape sequence '\\{c}'"),
			InvalidNumber(s) => write!(f, "Invalid number literal '{s}'"),
		}
	}
}

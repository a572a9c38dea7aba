//! The scanner groups source characters into tokens using Sol's lexical
//! grammar. Whitespace and `//` line comments are dropped, every other
//! lexeme becomes a [`Token`] carrying the location of its first character.
//!
//! Scanning is fail-fast: the first lexical error aborts the scan, matching
//! the one-diagnostic-per-pass rule shared by the parser and both backends.

mod token;

use std::{iter::Peekable, str::CharIndices};

use TokenType::*;
pub use token::{LiteralValue, Token, TokenType};

use crate::{error::scanner::{ScanError, ScanErrorKind}, location::CodeLocation};

/// A scanner for Sol source code.
pub struct Scanner<'a> {
	/// User input source code.
	source:      &'a str,
	/// User input source code iterator.
	source_iter: Peekable<CharIndices<'a>>,
	/// Byte offset of the beginning of the current lexeme.
	start:       usize,
	/// Byte offset just past the character currently being considered.
	cursor:      usize,
	/// Line of the character currently being considered.
	line:        usize,
	/// Column of the character currently being considered.
	col:         usize,
	/// Location of the first character of the current lexeme.
	start_location: CodeLocation,
}

impl<'a> Scanner<'a> {
	pub fn new(source: &'a str) -> Self {
		let source_iter = source.char_indices().peekable();

		Self {
			source,
			source_iter,
			start: 0,
			cursor: 0,
			line: 1,
			col: 1,
			start_location: CodeLocation::new(1, 1, 0),
		}
	}

	/// Scan all tokens from the source code.
	pub fn scan(mut self) -> Result<Vec<Token>, ScanError> {
		let mut tokens = Vec::new();
		while let Some(&(index, _)) = self.source_iter.peek() {
			// We are at the beginning of the next lexeme.
			self.start = index;
			self.cursor = self.start;
			self.start_location = CodeLocation::new(self.line, self.col, self.start);
			self.scan_token(&mut tokens)?;
		}
		tokens.push(Token::new(CodeLocation::new(self.line, self.col, self.cursor), Eof, ""));
		Ok(tokens)
	}

	/// Scan a single token from the source code.
	fn scan_token(&mut self, tokens: &mut Vec<Token>) -> Result<(), ScanError> {
		let Some(next_char) = self.advance() else { return Ok(()) };
		let kind = match next_char {
			'(' => LeftParen,
			')' => RightParen,
			'{' => LeftBrace,
			'}' => RightBrace,
			',' => Comma,
			'.' => Dot,
			';' => Semicolon,
			'%' => Percent,
			'-' => if self.match_next('-') { MinusMinus } else { Minus },
			'+' => if self.match_next('+') { PlusPlus } else { Plus },
			'*' => if self.match_next('*') { StarStar } else { Star },
			'!' => if self.match_next('=') { BangEqual } else { Bang },
			'=' => if self.match_next('=') { EqualEqual } else { Equal },
			'<' => if self.match_next('=') { LessEqual } else { Less },
			'>' => if self.match_next('=') { GreaterEqual } else { Greater },
			'/' => {
				if self.match_next('/') {
					while self.peek().is_some_and(|c| c != '\n') {
						self.advance();
					}
					return Ok(());
				}
				Slash
			}
			' ' | '\r' | '\t' | '\n' => return Ok(()),
			'"' => return self.string(tokens),
			c if c.is_ascii_digit() => return self.number(tokens),
			c if c.is_ascii_alphabetic() || c == '_' => return Ok(self.identifier(tokens)),
			c => return Err(self.error(ScanErrorKind::UnexpectedCharacter(c))),
		};

		tokens.push(Token::new(self.start_location.clone(), kind, &self.source[self.start..self.cursor]));
		Ok(())
	}

	fn error(&self, kind: ScanErrorKind) -> ScanError { ScanError::new(self.start_location.clone(), kind) }

	/// Match the next character if it is the expected one.
	fn match_next(&mut self, expected: char) -> bool {
		matches!(self.peek(), Some(c) if c == expected && { self.advance(); true })
	}

	/// Advance to the next character, keeping line and column in sync.
	fn advance(&mut self) -> Option<char> {
		let (i, c) = self.source_iter.next()?;
		self.cursor = i + c.len_utf8();
		if c == '\n' {
			self.line += 1;
			self.col = 1;
		} else {
			self.col += 1;
		}
		Some(c)
	}

	/// Peek the current character.
	fn peek(&mut self) -> Option<char> { self.source_iter.peek().map(|&(_, c)| c) }

	/// Peek the second character ahead.
	fn peek_second(&mut self) -> Option<char> {
		let mut it = self.source_iter.clone();
		it.next()?;
		it.peek().map(|&(_, c)| c)
	}

	/// Scan a string literal, processing escape sequences. Strings may span
	/// multiple lines.
	fn string(&mut self, tokens: &mut Vec<Token>) -> Result<(), ScanError> {
		let mut value = std::string::String::new();
		loop {
			match self.peek() {
				None => return Err(self.error(ScanErrorKind::UnterminatedString)),
				Some('"') => break,
				Some('\\') => {
					self.advance();
					let escape = match self.advance() {
						Some('"') => '"',
						Some('\\') => '\\',
						Some('n') => '\n',
						Some('t') => '\t',
						other => {
							return Err(
								self.error(ScanErrorKind::IllegalEscape(other.unwrap_or('\0'))),
							);
						}
					};
					value.push(escape);
				}
				Some(c) => {
					value.push(c);
					self.advance();
				}
			}
		}
		self.advance(); // the closing "

		let lexeme = &self.source[self.start..self.cursor];
		tokens.push(Token::with_literal(
			self.start_location.clone(),
			TokenType::String,
			lexeme,
			LiteralValue::Str(value),
		));
		Ok(())
	}

	/// Scan a number literal.
	fn number(&mut self, tokens: &mut Vec<Token>) -> Result<(), ScanError> {
		while self.peek().is_some_and(|c| c.is_ascii_digit()) {
			self.advance();
		}

		// Look for a fractional part.
		if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
			self.advance(); // consume '.'
			while self.peek().is_some_and(|c| c.is_ascii_digit()) {
				self.advance();
			}
		}

		let lexeme = &self.source[self.start..self.cursor];
		let value = lexeme
			.parse()
			.map_err(|_| self.error(ScanErrorKind::InvalidNumber(lexeme.to_string())))?;
		tokens.push(Token::with_literal(self.start_location.clone(), Number, lexeme, LiteralValue::Number(value)));
		Ok(())
	}

	/// Scan an identifier or keyword.
	fn identifier(&mut self, tokens: &mut Vec<Token>) {
		while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
			self.advance();
		}
		let text = &self.source[self.start..self.cursor];
		let kind = TokenType::keyword(text).unwrap_or(Identifier);
		tokens.push(Token::new(self.start_location.clone(), kind, text));
	}
}

pub mod compiler;
pub mod interpreter;
pub mod parser;
pub mod scanner;

/// SolError is the top-level error type for the Sol interpreter/compiler.
#[derive(thiserror::Error, Debug)]
pub enum SolError {
	/// Internal error, should never happen
	#[error("InternalError: {0}")]
	Internal(#[from] anyhow::Error),
	/// Lexical error encountered while scanning
	#[error(transparent)]
	Scan(#[from] scanner::ScanError),
	/// Syntax error encountered while parsing
	#[error(transparent)]
	Parse(#[from] parser::ParseError),
	/// Runtime error encountered during interpretation
	#[error("Runtime error: {0}")]
	Runtime(#[from] interpreter::RuntimeError),
	/// Error encountered while lowering the AST to bytecode
	#[error(transparent)]
	Compile(#[from] compiler::CompileError),
}

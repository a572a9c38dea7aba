use std::{
	fs::{self, read_to_string},
	io::Write,
	path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
	bytecode::Compiler,
	error::SolError,
	interpreter::Interpreter,
	parser::Parser,
	reporter::ErrorReporter,
	scanner::Scanner,
	statement::Stmt,
};

/// Sol is the main entry point tying the passes together: scan, parse, then
/// either interpret the AST or lower it to bytecode.
pub struct Sol;

impl Sol {
	/// Run a script file through the tree-walking backend.
	pub fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SolError> {
		let mut reporter = ErrorReporter::new(path.as_ref().display().to_string());
		let result = read_to_string(&path)
			.context("Failed open source file")
			.map_err(SolError::from)
			.and_then(|source| self.run(&source));
		if let Err(e) = &result {
			reporter.report(e);
		}
		result
	}

	/// Run the REPL prompt.
	pub fn run_prompt(&self) {
		println!("Sol REPL v0.1");
		let mut input = String::new();
		let stdin = std::io::stdin();
		loop {
			input.clear();
			print!("> ");
			if let Err(e) = std::io::stdout().flush() {
				eprintln!("Failed flush: {e}");
			}
			match stdin.read_line(&mut input) {
				Ok(0) => {
					println!("\nExited sol repl");
					break;
				}
				Ok(_) => {}
				Err(e) => {
					eprintln!("Failed read line: {e}");
					continue;
				}
			}
			let mut reporter = ErrorReporter::new("<REPL>");
			if let Err(e) = self.run(input.trim()) {
				reporter.report(&e);
			}
		}
	}

	/// Compile a script file to its binary bytecode form. Returns the path
	/// the blob was written to.
	pub fn compile_file<P: AsRef<Path>>(
		&self,
		path: P,
		output: Option<PathBuf>,
		disassemble: bool,
	) -> Result<PathBuf, SolError> {
		let mut reporter = ErrorReporter::new(path.as_ref().display().to_string());
		let result = self.compile(path.as_ref(), output, disassemble);
		if let Err(e) = &result {
			reporter.report(e);
		}
		result
	}

	/// Run source code on the given interpreter. Exposed for embedding and
	/// tests; `run_file`/`run_prompt` wrap it with diagnostics reporting.
	pub fn run_with(&self, source: &str, interpreter: &mut Interpreter) -> Result<(), SolError> {
		let statements = self.front_end(source)?;
		interpreter.interpret(&statements)?;
		Ok(())
	}

	fn run(&self, source: &str) -> Result<(), SolError> {
		let mut interpreter = Interpreter::new();
		self.run_with(source, &mut interpreter)
	}

	fn compile(&self, path: &Path, output: Option<PathBuf>, disassemble: bool) -> Result<PathBuf, SolError> {
		let source = read_to_string(path).context("Failed open source file")?;
		let statements = self.front_end(&source)?;
		let builder = Compiler::new().compile(&statements)?;
		if disassemble {
			print!("{}", builder.disassemble());
		}
		let output = output.unwrap_or_else(|| path.with_extension("solb"));
		fs::write(&output, builder.assemble()).context("Failed write bytecode file")?;
		Ok(output)
	}

	fn front_end(&self, source: &str) -> Result<Vec<Stmt>, SolError> {
		let tokens = Scanner::new(source).scan()?;
		Ok(Parser::new(tokens).parse()?)
	}
}

use std::path::PathBuf;

use palc::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rsol", after_long_help = "Interpreter and bytecode compiler for the Sol language.")]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Run a script file
	File { path: PathBuf },
	/// Start an interactive prompt
	Repl,
	/// Compile a script to binary bytecode
	Compile {
		path:        PathBuf,
		/// Output path, defaults to the input with a .solb extension
		#[arg(short, long)]
		output:      Option<PathBuf>,
		/// Print the instruction listing to stdout
		#[arg(long)]
		disassemble: bool,
	},
}

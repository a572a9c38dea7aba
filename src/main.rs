use palc::Parser;
use rsol::cli::*;

fn main() {
	let sol = rsol::Sol;

	let code = match Cli::parse().mode {
		Mode::File { path } => match sol.run_file(&path) {
			Ok(()) => 0,
			Err(_) => 1,
		},
		Mode::Repl => {
			sol.run_prompt();
			0
		}
		Mode::Compile { path, output, disassemble } => match sol.compile_file(&path, output, disassemble) {
			Ok(_) => 0,
			Err(_) => 1,
		},
	};
	std::process::exit(code);
}

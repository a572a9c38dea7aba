use std::path::PathBuf;

use rsol::{Interpreter, Sol, SolError};

fn script(name: &str) -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("scripts").join(name)
}

#[test]
fn runs_script_files() {
	let sol = Sol;
	assert!(sol.run_file(script("fib.sol")).is_ok());
	assert!(sol.run_file(script("closures.sol")).is_ok());
	assert!(sol.run_file(script("loops.sol")).is_ok());
}

#[test]
fn missing_file_is_an_internal_error() {
	assert!(matches!(Sol.run_file(script("missing.sol")), Err(SolError::Internal(_))));
}

#[test]
fn surfaces_one_error_per_pass() {
	let sol = Sol;
	let mut interpreter = Interpreter::new();
	assert!(matches!(sol.run_with("mut s = \"oops", &mut interpreter), Err(SolError::Scan(_))));
	assert!(matches!(sol.run_with("print ;", &mut interpreter), Err(SolError::Parse(_))));
	assert!(matches!(sol.run_with("print x;", &mut interpreter), Err(SolError::Runtime(_))));
}

#[test]
fn repl_style_state_survives_across_sources() {
	let sol = Sol;
	let mut interpreter = Interpreter::new();
	sol.run_with("mut x = 2;", &mut interpreter).unwrap();
	sol.run_with("x = x * 21;", &mut interpreter).unwrap();
	assert!(matches!(
		sol.run_with("mut x = 0;", &mut interpreter),
		Err(SolError::Runtime(rsol::RuntimeError::AlreadyDefined { .. }))
	));
}

#[test]
fn compiles_to_a_bytecode_file() {
	let sol = Sol;
	let output = std::env::temp_dir().join("rsol_compile_test.solb");
	let written = sol.compile_file(script("compile.sol"), Some(output.clone()), false).unwrap();
	assert_eq!(written, output);

	let bytes = std::fs::read(&output).unwrap();
	// The first statement is `mut limit = 3;`: DefineVar with the
	// length-prefixed name, then the push of the number literal.
	assert_eq!(bytes[0], 0x06);
	assert_eq!(bytes[1..5], 5i32.to_be_bytes());
	assert_eq!(&bytes[5..10], b"limit");
	assert_eq!(bytes[10], 0x01);
	let _ = std::fs::remove_file(&output);
}

#[test]
fn bytecode_rejects_functions() {
	let sol = Sol;
	let output = std::env::temp_dir().join("rsol_reject_test.solb");
	assert!(matches!(
		sol.compile_file(script("fib.sol"), Some(output), false),
		Err(SolError::Compile(_))
	));
}

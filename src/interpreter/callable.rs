use std::fmt;

use super::{Flow, Interpreter, value::Value};
use crate::{environment::Environment, error::interpreter::RuntimeError, statement::Function, utils::RcCell};

/// The contract a value must satisfy to appear on the left of `(...)`.
pub trait SolCallable {
	fn arity(&self) -> usize;
	fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, RuntimeError>;
}

/// A user-declared function paired with the environment that was active at
/// declaration time. Capturing the frame itself (not a copy) is what makes
/// closures see later mutations of their enclosing scope.
pub struct SolFunction {
	declaration: Function,
	closure:     RcCell<Environment>,
}

impl SolFunction {
	pub fn new(declaration: Function, closure: RcCell<Environment>) -> Self { Self { declaration, closure } }

	pub fn name(&self) -> &str { &self.declaration.name.lexeme }
}

impl SolCallable for SolFunction {
	fn arity(&self) -> usize { self.declaration.parameters.len() }

	fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
		let mut environment = Environment::with_parent(self.closure.clone());
		for (parameter, argument) in self.declaration.parameters.iter().zip(arguments) {
			environment
				.define(&parameter.lexeme, argument)
				.map_err(|e| e.at(parameter.location.clone()))?;
		}

		match interpreter.execute_block(&self.declaration.body, RcCell::new(environment))? {
			Flow::Return(_, value) => Ok(value),
			// A `break` can't cross a call boundary: there is no enclosing
			// loop it could belong to.
			Flow::Break(location) => Err(RuntimeError::BreakOutsideLoop { location }),
			Flow::Normal => Ok(Value::Nil),
		}
	}
}

// Manual impl: the closure environment may contain this very function,
// deriving Debug would chase the cycle.
impl fmt::Debug for SolFunction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SolFunction").field("name", &self.name()).finish_non_exhaustive()
	}
}

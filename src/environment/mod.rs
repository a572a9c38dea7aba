use std::collections::HashMap;

use crate::{error::interpreter::EnvironmentError, interpreter::value::Value, utils::RcCell};

/// A scope frame mapping names to values, linked to a parent frame.
///
/// Block scopes are pushed on entry and discarded on exit; a closure keeps
/// its defining frame alive by holding the same `RcCell`, which is why the
/// chain is reference-counted rather than owned by the interpreter.
#[derive(Debug, Default)]
pub struct Environment {
	values: HashMap<String, Value>,
	parent: Option<RcCell<Environment>>,
}

impl Environment {
	pub fn new() -> Self { Self::default() }

	pub fn with_parent(parent: RcCell<Environment>) -> Self {
		Self { values: HashMap::new(), parent: Some(parent) }
	}

	/// Create a new binding in this frame. Fails if the name is already
	/// bound here; parent frames are not consulted.
	pub fn define(&mut self, name: &str, value: Value) -> Result<(), EnvironmentError> {
		if self.values.contains_key(name) {
			return Err(EnvironmentError::AlreadyDefined(name.to_string()));
		}
		self.values.insert(name.to_string(), value);
		Ok(())
	}

	/// Read a binding, searching this frame then the parent chain.
	pub fn get(&self, name: &str) -> Result<Value, EnvironmentError> {
		if let Some(value) = self.values.get(name) {
			return Ok(value.clone());
		}
		match &self.parent {
			Some(parent) => parent.borrow().get(name),
			None => Err(EnvironmentError::NotDefined(name.to_string())),
		}
	}

	/// Write to an existing binding, mutating the frame that owns it. Never
	/// creates a binding in an ancestor frame.
	pub fn set(&mut self, name: &str, value: Value) -> Result<(), EnvironmentError> {
		if let Some(slot) = self.values.get_mut(name) {
			*slot = value;
			return Ok(());
		}
		match &self.parent {
			Some(parent) => parent.borrow_mut().set(name, value),
			None => Err(EnvironmentError::NotDefined(name.to_string())),
		}
	}
}

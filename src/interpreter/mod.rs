//! The tree-walking backend.
//!
//! The interpreter walks the AST directly: expressions evaluate to a
//! [`Value`], statements execute for their side effects and report how
//! control left them via [`Flow`]. `break` and `return` are ordinary values
//! propagated outward, not unwinding; each enclosing statement decides
//! whether to absorb or re-propagate them.

pub(crate) mod callable;
pub(crate) mod value;

use std::{io::Write, rc::Rc};

use callable::{SolCallable, SolFunction};
use value::Value;

use crate::{
	environment::Environment,
	error::interpreter::RuntimeError,
	location::CodeLocation,
	parser::expression::Expr,
	scanner::{LiteralValue, Token, TokenType},
	statement::Stmt,
	utils::RcCell,
};

/// The outcome of executing a single statement.
///
/// `Break` unwinds to the nearest enclosing loop, `Return` to the nearest
/// call boundary; either one surviving to the top level is a runtime error.
#[derive(Debug)]
pub enum Flow {
	Normal,
	Break(CodeLocation),
	Return(CodeLocation, Value),
}

/// Interpreter that executes Sol programs.
pub struct Interpreter {
	/// The currently active scope frame.
	environment: RcCell<Environment>,
	/// Where `print` writes to; stdout outside of tests.
	out:         Box<dyn Write>,
}

impl Default for Interpreter {
	fn default() -> Self { Self::new() }
}

impl Interpreter {
	pub fn new() -> Self { Self::with_output(Box::new(std::io::stdout())) }

	pub fn with_output(out: Box<dyn Write>) -> Self {
		Self { environment: RcCell::new(Environment::new()), out }
	}

	/// Execute a program. Fail-fast: the first runtime error aborts the
	/// remaining statements. A `break` or `return` surviving to this level
	/// is a runtime error as well.
	pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
		for statement in statements {
			match self.execute(statement)? {
				Flow::Normal => {}
				Flow::Break(location) => return Err(RuntimeError::BreakOutsideLoop { location }),
				Flow::Return(location, _) => return Err(RuntimeError::ReturnOutsideFunction { location }),
			}
		}
		Ok(())
	}

	fn execute(&mut self, statement: &Stmt) -> Result<Flow, RuntimeError> {
		match statement {
			Stmt::Expression(expression) => {
				self.evaluate(expression)?;
			}
			Stmt::Print(expression) => {
				let value = self.evaluate(expression)?;
				writeln!(self.out, "{value}").expect("failed writing to output");
			}
			Stmt::MutDeclaration { name, initializer } => {
				let value = match initializer {
					Some(expression) => self.evaluate(expression)?,
					None => Value::Nil,
				};
				self
					.environment
					.borrow_mut()
					.define(&name.lexeme, value)
					.map_err(|e| e.at(name.location.clone()))?;
			}
			Stmt::Function(function) => {
				let value = SolFunction::new(function.clone(), self.environment.clone());
				self
					.environment
					.borrow_mut()
					.define(&function.name.lexeme, Value::Function(Rc::new(value)))
					.map_err(|e| e.at(function.name.location.clone()))?;
			}
			Stmt::Block(statements) => {
				let environment = Environment::with_parent(self.environment.clone());
				return self.execute_block(statements, RcCell::new(environment));
			}
			Stmt::If { condition, then_branch, else_branch } => {
				if self.evaluate(condition)?.is_truthy() {
					return self.execute(then_branch);
				}
				if let Some(else_branch) = else_branch {
					return self.execute(else_branch);
				}
			}
			Stmt::While { condition, body } => {
				while self.evaluate(condition)?.is_truthy() {
					match self.execute(body)? {
						Flow::Normal => {}
						Flow::Break(_) => break,
						flow @ Flow::Return(..) => return Ok(flow),
					}
				}
			}
			Stmt::Break { keyword } => return Ok(Flow::Break(keyword.location.clone())),
			Stmt::Return { keyword, value } => {
				let value = match value {
					Some(expression) => self.evaluate(expression)?,
					None => Value::Nil,
				};
				return Ok(Flow::Return(keyword.location.clone(), value));
			}
			Stmt::Class { name, .. } => {
				return Err(RuntimeError::NotSupported {
					what: "Class declarations are",
					location: name.location.clone(),
				});
			}
			Stmt::ConstDeclaration { name, .. } => {
				return Err(RuntimeError::NotSupported {
					what: "Const declarations are",
					location: name.location.clone(),
				});
			}
		}
		Ok(Flow::Normal)
	}

	/// Execute statements in the given scope frame, restoring the previous
	/// frame on every exit path: normal completion, `break`, `return` and
	/// error propagation alike.
	pub(crate) fn execute_block(
		&mut self,
		statements: &[Stmt],
		environment: RcCell<Environment>,
	) -> Result<Flow, RuntimeError> {
		let previous = std::mem::replace(&mut self.environment, environment);
		let mut outcome = Ok(Flow::Normal);
		for statement in statements {
			match self.execute(statement) {
				Ok(Flow::Normal) => continue,
				other => {
					outcome = other;
					break;
				}
			}
		}
		self.environment = previous;
		outcome
	}

	fn evaluate(&mut self, expression: &Expr) -> Result<Value, RuntimeError> {
		match expression {
			Expr::Literal { value, .. } => Ok(match value {
				LiteralValue::Number(n) => Value::Number(*n),
				LiteralValue::Str(s) => Value::Str(s.clone()),
				LiteralValue::Boolean(b) => Value::Boolean(*b),
				LiteralValue::Nil => Value::Nil,
			}),
			Expr::Grouping(inner) => self.evaluate(inner),
			Expr::Variable { name } => {
				self.environment.borrow().get(&name.lexeme).map_err(|e| e.at(name.location.clone()))
			}
			Expr::Assign { name, value } => {
				let value = self.evaluate(value)?;
				self
					.environment
					.borrow_mut()
					.set(&name.lexeme, value.clone())
					.map_err(|e| e.at(name.location.clone()))?;
				Ok(value)
			}
			Expr::Unary { operator, right } => {
				let right = self.evaluate(right)?;
				match operator.kind {
					TokenType::Bang => Ok(Value::Boolean(!right.is_truthy())),
					TokenType::Minus => match right {
						Value::Number(n) => Ok(Value::Number(-n)),
						other => Err(RuntimeError::NegateNonNumber {
							type_name: other.type_name(),
							location: operator.location.clone(),
						}),
					},
					_ => Err(RuntimeError::NotSupported {
						what: "This unary operator is",
						location: operator.location.clone(),
					}),
				}
			}
			Expr::Binary { left, operator, right } => {
				// The right operand evaluates before the left one; this is
				// observable through side effects and must stay this way.
				let right = self.evaluate(right)?;
				let left = self.evaluate(left)?;
				self.binary_op(&left, operator, &right)
			}
			Expr::Logical { left, operator, right } => {
				let left = self.evaluate(left)?;
				match operator.kind {
					TokenType::Or if left.is_truthy() => Ok(left),
					TokenType::And if !left.is_truthy() => Ok(left),
					_ => self.evaluate(right),
				}
			}
			Expr::Postfix { left, operator } => self.postfix(left, operator),
			Expr::Call { callee, paren, arguments } => {
				let callee = self.evaluate(callee)?;
				let mut args = Vec::with_capacity(arguments.len());
				for argument in arguments {
					args.push(self.evaluate(argument)?);
				}

				let function = match callee {
					Value::Function(function) => function,
					other => {
						return Err(RuntimeError::NotCallable {
							type_name: other.type_name(),
							location: paren.location.clone(),
						});
					}
				};
				if args.len() != function.arity() {
					return Err(RuntimeError::WrongArity {
						expected: function.arity(),
						actual: args.len(),
						location: paren.location.clone(),
					});
				}
				function.call(self, args)
			}
			Expr::Get { name, .. } => Err(RuntimeError::NotSupported {
				what: "Property access is",
				location: name.location.clone(),
			}),
			Expr::Set { name, .. } => Err(RuntimeError::NotSupported {
				what: "Property assignment is",
				location: name.location.clone(),
			}),
			Expr::This { keyword } => Err(RuntimeError::NotSupported {
				what: "'this' is",
				location: keyword.location.clone(),
			}),
			Expr::Super { keyword, .. } => Err(RuntimeError::NotSupported {
				what: "'super' is",
				location: keyword.location.clone(),
			}),
		}
	}

	fn binary_op(&self, left: &Value, operator: &Token, right: &Value) -> Result<Value, RuntimeError> {
		use TokenType::*;
		match operator.kind {
			EqualEqual => return Ok(Value::Boolean(left == right)),
			BangEqual => return Ok(Value::Boolean(left != right)),
			Plus => {
				if let (Value::Number(l), Value::Number(r)) = (left, right) {
					return Ok(Value::Number(l + r));
				}
				// Any non-number operand turns + into concatenation of the
				// stringified operands.
				return Ok(Value::Str(format!("{left}{right}")));
			}
			_ => {}
		}

		let (l, r) = match (left, right) {
			(Value::Number(l), Value::Number(r)) => (*l, *r),
			_ => {
				return Err(RuntimeError::UnsupportedBinaryOperands {
					operator: operator.lexeme.clone(),
					left: left.type_name(),
					right: right.type_name(),
					location: operator.location.clone(),
				});
			}
		};
		Ok(match operator.kind {
			Minus => Value::Number(l - r),
			Star => Value::Number(l * r),
			// Division is IEEE-754: dividing by zero yields an infinity.
			Slash => Value::Number(l / r),
			Percent => Value::Number(l % r),
			StarStar => Value::Number(l.powf(r)),
			Less => Value::Boolean(l < r),
			LessEqual => Value::Boolean(l <= r),
			Greater => Value::Boolean(l > r),
			GreaterEqual => Value::Boolean(l >= r),
			_ => {
				return Err(RuntimeError::UnsupportedBinaryOperands {
					operator: operator.lexeme.clone(),
					left: left.type_name(),
					right: right.type_name(),
					location: operator.location.clone(),
				});
			}
		})
	}

	/// `i++` / `i--`: read the current value, write back the stepped value
	/// into the owning frame, yield the value read.
	fn postfix(&mut self, left: &Expr, operator: &Token) -> Result<Value, RuntimeError> {
		let Expr::Variable { name } = left else {
			return Err(RuntimeError::NotSupported {
				what: "Postfix on a non-variable is",
				location: operator.location.clone(),
			});
		};

		let value = self.environment.borrow().get(&name.lexeme).map_err(|e| e.at(name.location.clone()))?;
		let n = match value {
			Value::Number(n) => n,
			other => {
				return Err(RuntimeError::PostfixNonNumber {
					operator: operator.lexeme.clone(),
					type_name: other.type_name(),
					location: operator.location.clone(),
				});
			}
		};
		let next = if operator.kind == TokenType::PlusPlus { n + 1.0 } else { n - 1.0 };
		self
			.environment
			.borrow_mut()
			.set(&name.lexeme, Value::Number(next))
			.map_err(|e| e.at(name.location.clone()))?;
		Ok(Value::Number(n))
	}
}

#[cfg(test)]
mod tests {
	use std::{cell::RefCell, rc::Rc};

	use super::*;
	use crate::{parser::Parser, scanner::Scanner};

	/// A cloneable sink so the test can read what the interpreter printed.
	#[derive(Clone, Default)]
	struct SharedBuf(Rc<RefCell<Vec<u8>>>);

	impl Write for SharedBuf {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.0.borrow_mut().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
	}

	fn run(source: &str) -> Result<String, RuntimeError> {
		let tokens = Scanner::new(source).scan().unwrap();
		let statements = Parser::new(tokens).parse().unwrap();
		let buffer = SharedBuf::default();
		let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
		interpreter.interpret(&statements)?;
		let bytes = buffer.0.borrow().clone();
		Ok(String::from_utf8(bytes).unwrap())
	}

	fn prints(source: &str, expected: &str) { assert_eq!(run(source).unwrap(), expected); }

	#[test]
	fn arithmetic_precedence() {
		prints("print 2 + 3 * 2;", "8\n");
		prints("print 2 ** 3 ** 2;", "512\n");
		prints("print 7 % 3;", "1\n");
		prints("print 10 / 4;", "2.5\n");
		prints("print (1 + 2) * 3;", "9\n");
		prints("print -2 ** 2;", "4\n");
	}

	#[test]
	fn plus_concatenates_non_numbers() {
		prints("print 1 + 2;", "3\n");
		prints("print \"a\" + \"b\";", "ab\n");
		prints("print \"a\" + 1;", "a1\n");
		prints("print 1 + \"a\";", "1a\n");
		prints("print nil + 1;", "nil1\n");
	}

	#[test]
	fn comparisons_and_equality() {
		prints("print 1 < 2;", "true\n");
		prints("print 2 <= 2;", "true\n");
		prints("print 1 > 2;", "false\n");
		prints("print 1 == 1;", "true\n");
		prints("print 1 == \"1\";", "false\n");
		prints("print nil == false;", "false\n");
		prints("print 1 != 2;", "true\n");
	}

	#[test]
	fn arithmetic_type_errors() {
		let err = run("print 1 - \"a\";").unwrap_err();
		assert!(matches!(
			err,
			RuntimeError::UnsupportedBinaryOperands { left: "number", right: "string", .. }
		));
		assert!(matches!(run("print -\"a\";").unwrap_err(), RuntimeError::NegateNonNumber { .. }));
	}

	#[test]
	fn binary_evaluates_right_operand_first() {
		// Right first: the right `i` reads 1, then `i++` on the left also
		// reads 1. Left-to-right would print 3.
		prints("mut i = 1; print i++ + i;", "2\n");
	}

	#[test]
	fn truthiness() {
		prints("print !nil;", "true\n");
		prints("print !false;", "true\n");
		prints("print !0;", "false\n");
		prints("print !\"\";", "false\n");
		// Zero is truthy, so the then-branch runs.
		prints("if 0 { print 1; } else { print 2; }", "1\n");
	}

	#[test]
	fn logical_short_circuit() {
		prints("print 1 or 2;", "1\n");
		prints("print nil or \"x\";", "x\n");
		prints("print 1 and 2;", "2\n");
		prints("print false and 2;", "false\n");
		// The right operand must not be evaluated at all.
		prints("mut i = 0; mut x = false and i++; print i;", "0\n");
		prints("mut i = 0; mut x = true or i++; print i;", "0\n");
	}

	#[test]
	fn block_scoping() {
		prints("mut x = 1; { mut x = 2; print x; } print x;", "2\n1\n");
		prints("mut x = 1; { x = 2; } print x;", "2\n");
	}

	#[test]
	fn environment_restored_after_runtime_error() {
		let tokens = Scanner::new("mut x = 1; { mut y = 2; boom; }").scan().unwrap();
		let statements = Parser::new(tokens).parse().unwrap();
		let mut interpreter = Interpreter::with_output(Box::new(SharedBuf::default()));
		assert!(matches!(interpreter.interpret(&statements), Err(RuntimeError::NotDefined { .. })));
		// The block frame was popped on the error path.
		assert!(interpreter.environment.borrow().get("x").is_ok());
		assert!(interpreter.environment.borrow().get("y").is_err());
	}

	#[test]
	fn variables() {
		prints("mut x; print x;", "nil\n");
		prints("mut x = 1; x = x + 1; print x;", "2\n");
		assert!(matches!(run("mut x = 1; mut x = 2;").unwrap_err(), RuntimeError::AlreadyDefined { .. }));
		assert!(matches!(run("x = 1;").unwrap_err(), RuntimeError::NotDefined { .. }));
		assert!(matches!(run("print x;").unwrap_err(), RuntimeError::NotDefined { .. }));
	}

	#[test]
	fn postfix_yields_previous_value() {
		prints("mut i = 1; print i++; print i;", "1\n2\n");
		prints("mut i = 1; print i--; print i;", "1\n0\n");
		assert!(matches!(run("mut s = \"a\"; s++;").unwrap_err(), RuntimeError::PostfixNonNumber { .. }));
	}

	#[test]
	fn while_and_break() {
		prints("mut i = 0; while i < 5 { i = i + 1; if i == 3 { break; } } print i;", "3\n");
		prints("mut i = 0; while i < 3 { i = i + 1; } print i;", "3\n");
	}

	#[test]
	fn for_loop_desugar_runs() {
		prints("for (mut i = 0; i < 3; i++) { print i; }", "0\n1\n2\n");
		prints("mut i = 5; for (; i > 3;) { i = i - 1; } print i;", "3\n");
	}

	#[test]
	fn stray_control_flow_is_an_error() {
		assert!(matches!(run("break;").unwrap_err(), RuntimeError::BreakOutsideLoop { .. }));
		assert!(matches!(run("return 1;").unwrap_err(), RuntimeError::ReturnOutsideFunction { .. }));
		// A break inside a function body has no loop to unwind to either.
		assert!(matches!(run("fun f() { break; } f();").unwrap_err(), RuntimeError::BreakOutsideLoop { .. }));
	}

	#[test]
	fn function_calls() {
		prints("fun f(a) { return a + 1; } print f(2);", "3\n");
		prints("fun g() { 1 + 1; } print g();", "nil\n");
		prints("fun f() { return; } print f();", "nil\n");
		prints("fun f() { return 1; } print f;", "<fn f>\n");
	}

	#[test]
	fn call_arguments_evaluate_left_to_right() {
		prints("fun sub(a, b) { return a - b; } mut i = 1; print sub(i++, i);", "-1\n");
	}

	#[test]
	fn call_errors() {
		assert!(matches!(
			run("fun f(a) { return a; } f(1, 2);").unwrap_err(),
			RuntimeError::WrongArity { expected: 1, actual: 2, .. }
		));
		assert!(matches!(run("1();").unwrap_err(), RuntimeError::NotCallable { type_name: "number", .. }));
	}

	#[test]
	fn recursion() {
		prints(
			"fun fib(n) { if n < 2 { return n; } return fib(n - 1) + fib(n - 2); } print fib(10);",
			"55\n",
		);
	}

	#[test]
	fn closures_capture_the_defining_environment() {
		prints(
			"fun outer() { mut x = 42; fun inner() { return x; } return inner; } \
			 mut f = outer(); print f();",
			"42\n",
		);
		// The captured frame is shared, not copied: mutations persist
		// across calls.
		prints(
			"fun outer() { mut x = 1; fun bump() { x = x + 1; return x; } return bump; } \
			 mut f = outer(); print f(); print f();",
			"2\n3\n",
		);
	}

	#[test]
	fn stub_nodes_are_rejected() {
		assert!(matches!(run("const limit = 1;").unwrap_err(), RuntimeError::NotSupported { .. }));
		assert!(matches!(run("class A {}").unwrap_err(), RuntimeError::NotSupported { .. }));
	}
}

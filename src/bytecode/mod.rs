//! The bytecode backend.
//!
//! The compiler performs the same AST dispatch as the interpreter but emits
//! instructions instead of computing values. It keeps no value stack of its
//! own; the emitted program is stack-based and the stack exists only at
//! execution time. Forward jump targets are patch references resolved by the
//! [`BytecodeBuilder`] once the whole program has been emitted.

pub(crate) mod binary;
pub(crate) mod builder;
pub(crate) mod instruction;

use builder::{BytecodeBuilder, RefId};
use instruction::Instruction;

use crate::{
	error::compiler::{CompileError, CompileErrorKind},
	parser::expression::Expr,
	scanner::{LiteralValue, TokenType},
	statement::Stmt,
};

/// Compiles an AST into a linear instruction stream.
#[derive(Default)]
pub struct Compiler {
	builder: BytecodeBuilder,
	/// Exit references of the enclosing loops, innermost last; `break`
	/// jumps to the innermost one.
	loops:   Vec<RefId>,
}

impl Compiler {
	pub fn new() -> Self { Self::default() }

	/// Compile a program. The first unsupported AST shape aborts
	/// compilation.
	pub fn compile(mut self, statements: &[Stmt]) -> Result<BytecodeBuilder, CompileError> {
		for statement in statements {
			self.statement(statement)?;
		}
		// A control-flow statement at the very end of the program leaves its
		// exit reference waiting for a next instruction; anchor it so every
		// emitted jump resolves.
		if self.builder.has_pending() {
			self.builder.add(Instruction::NoOp);
		}
		Ok(self.builder)
	}

	fn statement(&mut self, statement: &Stmt) -> Result<(), CompileError> {
		match statement {
			Stmt::Expression(expression) => {
				self.expression(expression)?;
				self.builder.add(Instruction::Pop);
			}
			Stmt::Print(expression) => {
				self.expression(expression)?;
				// The NoOp holds the slot where a print opcode will land.
				self.builder.add(Instruction::NoOp);
				self.builder.add(Instruction::Pop);
			}
			Stmt::Block(statements) => {
				self.builder.add(Instruction::PushBlock);
				for inner in statements {
					self.statement(inner)?;
				}
				self.builder.add(Instruction::PopBlock);
			}
			Stmt::MutDeclaration { name, initializer } => {
				self.builder.add(Instruction::DefineVar(name.lexeme.clone()));
				if let Some(initializer) = initializer {
					self.expression(initializer)?;
					self.builder.add(Instruction::AssignVar(name.lexeme.clone()));
					self.builder.add(Instruction::Pop);
				}
			}
			Stmt::If { condition, then_branch, else_branch } => {
				self.expression(condition)?;
				let otherwise = self.builder.create_reference();
				self.builder.add(Instruction::JumpNotTruthy(otherwise));
				self.builder.add(Instruction::Pop);
				self.statement(then_branch)?;
				let end = self.builder.create_reference();
				self.builder.add(Instruction::Jump(end));
				// The false path discards the condition value too.
				self.builder.bind_to_next(otherwise);
				self.builder.add(Instruction::Pop);
				if let Some(else_branch) = else_branch {
					self.statement(else_branch)?;
				}
				self.builder.bind_to_next(end);
			}
			Stmt::While { condition, body } => {
				let start = self.builder.reference_to_next();
				self.expression(condition)?;
				let exit = self.builder.create_reference();
				self.builder.add(Instruction::JumpNotTruthy(exit));
				self.builder.add(Instruction::Pop);

				self.loops.push(exit);
				let body_result = self.statement(body);
				self.loops.pop();
				body_result?;

				self.builder.add(Instruction::Jump(start));
				self.builder.bind_to_next(exit);
				self.builder.add(Instruction::Pop);
			}
			Stmt::Break { keyword } => {
				let Some(&exit) = self.loops.last() else {
					return Err(CompileError::new(keyword.location.clone(), CompileErrorKind::BreakOutsideLoop));
				};
				// The exit label pops the condition value; push a filler so
				// the stack stays balanced when arriving from a break.
				self.builder.add(Instruction::PushNil);
				self.builder.add(Instruction::Jump(exit));
			}
			Stmt::Function(function) => {
				return Err(CompileError::new(
					function.name.location.clone(),
					CompileErrorKind::Unsupported("Function declarations are"),
				));
			}
			Stmt::Return { keyword, .. } => {
				return Err(CompileError::new(
					keyword.location.clone(),
					CompileErrorKind::Unsupported("'return' is"),
				));
			}
			Stmt::Class { name, .. } => {
				return Err(CompileError::new(
					name.location.clone(),
					CompileErrorKind::Unsupported("Class declarations are"),
				));
			}
			Stmt::ConstDeclaration { name, .. } => {
				return Err(CompileError::new(
					name.location.clone(),
					CompileErrorKind::Unsupported("Const declarations are"),
				));
			}
		}
		Ok(())
	}

	fn expression(&mut self, expression: &Expr) -> Result<(), CompileError> {
		match expression {
			Expr::Literal { value, .. } => {
				let instruction = match value {
					LiteralValue::Number(n) => Instruction::PushNumber(*n),
					LiteralValue::Str(s) => Instruction::PushString(s.clone()),
					LiteralValue::Boolean(b) => Instruction::PushBoolean(*b),
					LiteralValue::Nil => Instruction::PushNil,
				};
				self.builder.add(instruction);
			}
			Expr::Grouping(inner) => self.expression(inner)?,
			Expr::Variable { name } => self.builder.add(Instruction::LoadVar(name.lexeme.clone())),
			Expr::Assign { name, value } => {
				self.expression(value)?;
				// No pop: the assigned value is the expression's result.
				self.builder.add(Instruction::AssignVar(name.lexeme.clone()));
			}
			Expr::Binary { left, operator, right } => {
				// Right before left, matching the interpreter's evaluation
				// order.
				self.expression(right)?;
				self.expression(left)?;
				let instruction = match operator.kind {
					TokenType::EqualEqual => Instruction::CompareEquals,
					TokenType::BangEqual => Instruction::CompareNotEquals,
					TokenType::Plus => Instruction::Add,
					TokenType::Minus => Instruction::Subtract,
					TokenType::Star => Instruction::Multiply,
					TokenType::StarStar => Instruction::Exponentiate,
					TokenType::Slash => Instruction::Divide,
					TokenType::Percent => Instruction::Modulo,
					TokenType::Less => Instruction::CompareLess,
					TokenType::LessEqual => Instruction::CompareLessEqual,
					TokenType::Greater => Instruction::CompareGreater,
					TokenType::GreaterEqual => Instruction::CompareGreaterEqual,
					_ => {
						return Err(CompileError::new(
							operator.location.clone(),
							CompileErrorKind::UnsupportedOperator(operator.lexeme.clone()),
						));
					}
				};
				self.builder.add(instruction);
				// Discard both source operands from beneath the result; the
				// result must not alias either input slot.
				self.builder.add(Instruction::Swap);
				self.builder.add(Instruction::Pop);
				self.builder.add(Instruction::Swap);
				self.builder.add(Instruction::Pop);
			}
			Expr::Logical { left, operator, right } => {
				self.expression(left)?;
				let end = self.builder.create_reference();
				match operator.kind {
					TokenType::Or => self.builder.add(Instruction::JumpTruthy(end)),
					TokenType::And => self.builder.add(Instruction::JumpNotTruthy(end)),
					_ => {
						return Err(CompileError::new(
							operator.location.clone(),
							CompileErrorKind::UnsupportedOperator(operator.lexeme.clone()),
						));
					}
				}
				// Fall-through: the left value did not decide the result.
				self.builder.add(Instruction::Pop);
				self.expression(right)?;
				self.builder.bind_to_next(end);
			}
			Expr::Unary { operator, right } => {
				self.expression(right)?;
				match operator.kind {
					TokenType::Minus => self.builder.add(Instruction::Negate),
					TokenType::Bang => self.builder.add(Instruction::Not),
					_ => {
						return Err(CompileError::new(
							operator.location.clone(),
							CompileErrorKind::UnsupportedOperator(operator.lexeme.clone()),
						));
					}
				}
			}
			Expr::Postfix { left, operator } => {
				let Expr::Variable { name } = &**left else {
					return Err(CompileError::new(
						operator.location.clone(),
						CompileErrorKind::Unsupported("Postfix on a non-variable is"),
					));
				};
				let var = name.lexeme.clone();
				// The first load is the expression's result, the second is
				// stepped and written back.
				self.builder.add(Instruction::LoadVar(var.clone()));
				self.builder.add(Instruction::LoadVar(var.clone()));
				match operator.kind {
					TokenType::PlusPlus => self.builder.add(Instruction::Increment),
					_ => self.builder.add(Instruction::Decrement),
				}
				self.builder.add(Instruction::AssignVar(var));
				self.builder.add(Instruction::Pop);
			}
			Expr::Call { paren, .. } => {
				return Err(CompileError::new(
					paren.location.clone(),
					CompileErrorKind::Unsupported("Function calls are"),
				));
			}
			Expr::Get { name, .. } => {
				return Err(CompileError::new(
					name.location.clone(),
					CompileErrorKind::Unsupported("Property access is"),
				));
			}
			Expr::Set { name, .. } => {
				return Err(CompileError::new(
					name.location.clone(),
					CompileErrorKind::Unsupported("Property assignment is"),
				));
			}
			Expr::This { keyword } => {
				return Err(CompileError::new(
					keyword.location.clone(),
					CompileErrorKind::Unsupported("'this' is"),
				));
			}
			Expr::Super { keyword, .. } => {
				return Err(CompileError::new(
					keyword.location.clone(),
					CompileErrorKind::Unsupported("'super' is"),
				));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use Instruction::*;

	use super::*;
	use crate::{parser::Parser, scanner::Scanner};

	fn compile_source(source: &str) -> Result<BytecodeBuilder, CompileError> {
		let tokens = Scanner::new(source).scan().unwrap();
		let statements = Parser::new(tokens).parse().unwrap();
		Compiler::new().compile(&statements)
	}

	fn instructions(source: &str) -> Vec<Instruction> {
		compile_source(source).unwrap().instructions().to_vec()
	}

	#[test]
	fn binary_discards_both_operands() {
		// Right operand first, then the swap/pop/swap/pop discard sequence.
		assert_eq!(instructions("1 + 2;"), vec![
			PushNumber(2.0),
			PushNumber(1.0),
			Add,
			Swap,
			Pop,
			Swap,
			Pop,
			Pop,
		]);
	}

	#[test]
	fn comparison_operators() {
		assert_eq!(instructions("1 < 2;"), vec![
			PushNumber(2.0),
			PushNumber(1.0),
			CompareLess,
			Swap,
			Pop,
			Swap,
			Pop,
			Pop,
		]);
	}

	#[test]
	fn mut_declaration() {
		assert_eq!(instructions("mut x = 5;"), vec![
			DefineVar("x".to_string()),
			PushNumber(5.0),
			AssignVar("x".to_string()),
			Pop,
		]);
		assert_eq!(instructions("mut x;"), vec![DefineVar("x".to_string())]);
	}

	#[test]
	fn assignment_keeps_its_value() {
		// The statement-level Pop is the only one: AssignVar leaves the
		// value as the expression result.
		assert_eq!(instructions("mut x; x = 1;"), vec![
			DefineVar("x".to_string()),
			PushNumber(1.0),
			AssignVar("x".to_string()),
			Pop,
		]);
	}

	#[test]
	fn print_statement() {
		assert_eq!(instructions("print 1;"), vec![PushNumber(1.0), NoOp, Pop]);
	}

	#[test]
	fn literals() {
		assert_eq!(instructions("\"ab\";"), vec![PushString("ab".to_string()), Pop]);
		assert_eq!(instructions("nil;"), vec![PushNil, Pop]);
		assert_eq!(instructions("true;"), vec![PushBoolean(true), Pop]);
	}

	#[test]
	fn unary_compiles_its_operand() {
		assert_eq!(instructions("-1;"), vec![PushNumber(1.0), Negate, Pop]);
		assert_eq!(instructions("!true;"), vec![PushBoolean(true), Not, Pop]);
	}

	#[test]
	fn blocks_push_and_pop_scopes() {
		assert_eq!(instructions("{ 1; }"), vec![PushBlock, PushNumber(1.0), Pop, PopBlock]);
	}

	#[test]
	fn postfix_yields_previous_value() {
		assert_eq!(instructions("mut i; i++;"), vec![
			DefineVar("i".to_string()),
			LoadVar("i".to_string()),
			LoadVar("i".to_string()),
			Increment,
			AssignVar("i".to_string()),
			Pop,
			Pop,
		]);
	}

	#[test]
	fn logical_or_short_circuits_with_a_jump() {
		let listing = compile_source("true or false;").unwrap().disassemble();
		assert_eq!(
			listing,
			"0x03 - PushBoolean value = true\n\
			 0x1a - JumpTruthy dest = 10\n\
			 0x05 - Pop\n\
			 0x03 - PushBoolean value = false\n\
			 0x05 - Pop\n"
		);
	}

	#[test]
	fn while_loop_with_break() {
		let listing = compile_source("while true { break; }").unwrap().disassemble();
		assert_eq!(
			listing,
			"0x03 - PushBoolean value = true\n\
			 0x1b - JumpNotTruthy dest = 21\n\
			 0x05 - Pop\n\
			 0x11 - PushBlock\n\
			 0x04 - PushNil\n\
			 0x1c - Jump dest = 21\n\
			 0x12 - PopBlock\n\
			 0x1c - Jump dest = 0\n\
			 0x05 - Pop\n"
		);
	}

	#[test]
	fn if_else_anchors_trailing_reference() {
		// The end label of a trailing `if` has no next instruction; the
		// compiler appends a NoOp so the jump still resolves.
		let listing = compile_source("if true { 1; } else { 2; }").unwrap().disassemble();
		assert_eq!(
			listing,
			"0x03 - PushBoolean value = true\n\
			 0x1b - JumpNotTruthy dest = 25\n\
			 0x05 - Pop\n\
			 0x11 - PushBlock\n\
			 0x01 - PushNumber value = 1\n\
			 0x05 - Pop\n\
			 0x12 - PopBlock\n\
			 0x1c - Jump dest = 38\n\
			 0x05 - Pop\n\
			 0x11 - PushBlock\n\
			 0x01 - PushNumber value = 2\n\
			 0x05 - Pop\n\
			 0x12 - PopBlock\n\
			 0x00 - NoOp\n"
		);
	}

	#[test]
	fn serializes_through_the_builder() {
		let bytes = compile_source("1;").unwrap().assemble();
		let mut expected = vec![0x01];
		expected.extend_from_slice(&1.0f64.to_bits().to_be_bytes());
		expected.push(0x05);
		assert_eq!(bytes, expected);
	}

	#[test]
	fn break_outside_loop_is_a_compile_error() {
		let err = compile_source("break;").unwrap_err();
		assert!(matches!(err.kind, CompileErrorKind::BreakOutsideLoop));
	}

	#[test]
	fn unsupported_shapes_are_compile_errors() {
		assert!(matches!(
			compile_source("fun f() { return 1; }").unwrap_err().kind,
			CompileErrorKind::Unsupported(_)
		));
		assert!(matches!(compile_source("f();").unwrap_err().kind, CompileErrorKind::Unsupported(_)));
		assert!(matches!(compile_source("return 1;").unwrap_err().kind, CompileErrorKind::Unsupported(_)));
		assert!(matches!(
			compile_source("const x = 1;").unwrap_err().kind,
			CompileErrorKind::Unsupported(_)
		));
	}

	#[test]
	fn nested_loops_break_to_the_innermost_exit() {
		let source = "while true { while false { break; } break; }";
		let builder = compile_source(source).unwrap();
		// Two distinct JumpNotTruthy exits must appear, and the listing must
		// resolve every jump (no dest = 0 besides the loop restarts).
		let listing = builder.disassemble();
		assert_eq!(listing.matches("0x1b - JumpNotTruthy").count(), 2);
		assert_eq!(listing.matches("0x04 - PushNil").count(), 2);
	}
}

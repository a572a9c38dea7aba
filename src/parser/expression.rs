//! Expression AST nodes.
//!
//! An `Expr` is a tree structure representing code like `-123 * (45.67)` as
//! nested nodes. Nodes own their children exclusively and are never mutated
//! after the parser builds them; both backends consume them by matching.

use crate::{location::CodeLocation, scanner::{LiteralValue, Token}};

/// Expression AST nodes.
///
/// `Get`, `Set`, `Super` and `This` are surface stubs: the grammar never
/// produces them and both backends reject them, but they keep the node set
/// aligned with the statement stubs for classes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	Assign { name: Token, value: Box<Expr> },
	Binary { left: Box<Expr>, operator: Token, right: Box<Expr> },
	Call { callee: Box<Expr>, paren: Token, arguments: Vec<Expr> },
	Get { object: Box<Expr>, name: Token },
	Grouping(Box<Expr>),
	Literal { value: LiteralValue, location: CodeLocation },
	Logical { left: Box<Expr>, operator: Token, right: Box<Expr> },
	Set { object: Box<Expr>, name: Token, value: Box<Expr> },
	Super { keyword: Token, method: Token },
	This { keyword: Token },
	Unary { operator: Token, right: Box<Expr> },
	Variable { name: Token },
	Postfix { left: Box<Expr>, operator: Token },
}

impl Expr {
	pub fn literal(value: LiteralValue, location: CodeLocation) -> Self { Expr::Literal { value, location } }

	pub fn binary(left: Expr, operator: Token, right: Expr) -> Self {
		Expr::Binary { left: Box::new(left), operator, right: Box::new(right) }
	}

	pub fn logical(left: Expr, operator: Token, right: Expr) -> Self {
		Expr::Logical { left: Box::new(left), operator, right: Box::new(right) }
	}

	pub fn unary(operator: Token, right: Expr) -> Self { Expr::Unary { operator, right: Box::new(right) } }

	pub fn grouping(expr: Expr) -> Self { Expr::Grouping(Box::new(expr)) }

	pub fn assign(name: Token, value: Expr) -> Self { Expr::Assign { name, value: Box::new(value) } }

	pub fn call(callee: Expr, paren: Token, arguments: Vec<Expr>) -> Self {
		Expr::Call { callee: Box::new(callee), paren, arguments }
	}

	pub fn postfix(left: Expr, operator: Token) -> Self {
		Expr::Postfix { left: Box::new(left), operator }
	}
}

impl std::fmt::Display for Expr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use Expr::*;
		match self {
			Literal { value, .. } => write!(f, "{value}"),
			Unary { operator, right } => write!(f, "({} {right})", operator.lexeme),
			Binary { left, operator, right } | Logical { left, operator, right } => {
				write!(f, "({} {left} {right})", operator.lexeme)
			}
			Grouping(expression) => write!(f, "(group {expression})"),
			Variable { name } => write!(f, "{}", name.lexeme),
			Assign { name, value } => write!(f, "(= {} {value})", name.lexeme),
			Postfix { left, operator } => write!(f, "({} {left})", operator.lexeme),
			Call { callee, arguments, .. } => {
				write!(f, "(call {callee} (")?;
				for (i, argument) in arguments.iter().enumerate() {
					if i > 0 {
						write!(f, " ")?;
					}
					write!(f, "{argument}")?;
				}
				write!(f, "))")
			}
			Get { object, name } => write!(f, "(get {object}.{})", name.lexeme),
			Set { object, name, value } => write!(f, "(set {object}.{} {value})", name.lexeme),
			Super { method, .. } => write!(f, "(super {})", method.lexeme),
			This { .. } => write!(f, "this"),
		}
	}
}

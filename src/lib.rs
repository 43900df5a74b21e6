//! # lispcalc - A Prefix-Notation Calculator
//!
//! lispcalc reads fully parenthesized prefix expressions, one per line, parses
//! each into an n-ary expression tree and evaluates it against a table of
//! named variables.
//!
//! Every node is wrapped in parentheses, leaves included: `(5)`, `(+(1)(2))`,
//! `(median(3)(-(2))(5)(4))`.
//!
//! ## Quick Start
//!
//! ```rust
//! use lispcalc::{evaluate, parse, Environment};
//!
//! # fn main() -> lispcalc::Result<()> {
//! let mut env = Environment::new();
//!
//! let expr = parse("(=(c)(*(2)(4)))")?;
//! assert_eq!(evaluate(&expr, &mut env)?, 8.0);
//!
//! let expr = parse("(+(c)(1))")?;
//! assert_eq!(evaluate(&expr, &mut env)?, 9.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Operators
//!
//! | Token | Operands | Meaning |
//! |---|---|---|
//! | `+` | 1 or 2 | identity / sum |
//! | `-` | 1 or 2 | negation / difference |
//! | `*` | 2 | product |
//! | `/` | 2 | quotient, NaN when dividing by zero |
//! | `$` | 2 | sum of the integers from the first to the second operand |
//! | `=` | 2 | assign the second operand to the variable named by the first |
//! | `min` `max` `average` `median` | 1 or more | reducers |
//!
//! ## Error Handling
//!
//! Two kinds of failure are kept apart:
//!
//! - A broken expression (bad parentheses, unknown operator, wrong operand
//!   count) is an [`Error`].
//! - A well formed expression without a value (division by zero, descending
//!   range, unbound variable) evaluates to NaN.
//!
//! ```rust
//! # use lispcalc::{evaluate, parse, Environment, Error};
//! let mut env = Environment::new();
//!
//! let expr = parse("(/(10)(0))").unwrap();
//! assert!(evaluate(&expr, &mut env).unwrap().is_nan());
//!
//! let expr = parse("(*(10))").unwrap();
//! assert!(matches!(evaluate(&expr, &mut env), Err(Error::ArityMismatch { .. })));
//!
//! assert!(parse("(+(1)").is_err());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Line → Parser → Expression tree → Evaluator (+ Environment) → f64 / NaN → Session output
//! ```
//!
//! - [`parser`] - recursive-descent parser, tree arena and printers
//! - [`runtime`] - operator table, evaluator and variable environment
//! - [`session`] - the read-evaluate-print loop used by the `lispcalc` binary

/// Version of the lispcalc crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod parser;
pub mod runtime;
pub mod session;

// Re-export main types
pub use error::{Error, Result};
pub use parser::{parse, to_infix, ExprTree, Expression, NodeId, SExprParser};
pub use runtime::{evaluate, Environment, Evaluator, Operator};
pub use session::{EchoFormat, LineOutcome, Session, SessionConfig};

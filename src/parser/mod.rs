//! lispcalc parser module
//!
//! Turns bracketed prefix expressions like `(+(1)(*(2)(x)))` into expression trees.

mod printer;
mod sexpr_parser;
mod tree;

pub use printer::{to_infix, NodeView};
pub use sexpr_parser::{parse, SExprParser};
pub use tree::{ExprTree, Expression, NodeId, ASSIGN_TOKEN, END_COMMAND};

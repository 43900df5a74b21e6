//! Evaluation of parsed expressions against a variable environment

mod environment;
mod evaluator;
mod operator;

pub use environment::{is_name, parse_assignment_line, Environment};
pub use evaluator::{evaluate, Evaluator};
pub use operator::{Arity, Operator};

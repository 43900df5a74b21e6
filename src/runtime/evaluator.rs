use crate::error::{Error, Result};
use crate::parser::{ExprTree, Expression, NodeId};
use crate::runtime::environment::is_name;
use crate::runtime::{Environment, Operator};

/// Maximum distance from the nearest integer for a `$` bound to count as integral
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Tree-walking evaluator
///
/// Structural problems (unknown operator, wrong operand count, bad terminal,
/// bad assignment target) are returned as [`Error`]. Expressions without a
/// defined value evaluate to NaN, which ordinary float arithmetic carries up
/// to the root:
/// - division by zero
/// - `$` with descending or non-integral bounds
/// - reading an unbound variable
/// - any operand of `min`/`max`/`average`/`median` being NaN
pub struct Evaluator<'env> {
    env: &'env mut Environment,
}

impl<'env> Evaluator<'env> {
    /// Creates an evaluator reading and writing `env`
    pub fn new(env: &'env mut Environment) -> Self {
        Evaluator { env }
    }

    /// Evaluates a whole parsed expression
    pub fn evaluate(&mut self, expr: &Expression) -> Result<f64> {
        self.evaluate_node(expr.tree(), expr.root())
    }

    /// Evaluates the subtree rooted at `id`
    pub fn evaluate_node(&mut self, tree: &ExprTree, id: NodeId) -> Result<f64> {
        let token = tree.token(id);
        if !tree.has_children(id) {
            return self.eval_terminal(token);
        }

        let op = Operator::from_token(token).ok_or_else(|| Error::UnknownOperator {
            token: token.to_string(),
        })?;
        self.apply_operator(op, tree, id)
    }

    /// Applies `op` to the children of `id`, whatever the node's own token is
    pub fn apply_operator(&mut self, op: Operator, tree: &ExprTree, id: NodeId) -> Result<f64> {
        let children = tree.children(id);
        let arity = op.arity();
        if !arity.accepts(children.len()) {
            return Err(Error::arity(op.token(), &arity.describe(), children.len()));
        }
        tracing::trace!(operator = op.token(), operands = children.len(), "apply");

        match op {
            Operator::Plus => match children {
                [operand] => self.evaluate_node(tree, *operand),
                [left, right] => {
                    let a = self.evaluate_node(tree, *left)?;
                    let b = self.evaluate_node(tree, *right)?;
                    Ok(a + b)
                }
                _ => unreachable!("arity checked above"),
            },
            Operator::Minus => match children {
                [operand] => Ok(-self.evaluate_node(tree, *operand)?),
                [left, right] => {
                    let a = self.evaluate_node(tree, *left)?;
                    let b = self.evaluate_node(tree, *right)?;
                    Ok(a - b)
                }
                _ => unreachable!("arity checked above"),
            },
            Operator::Multiply => {
                let (a, b) = self.eval_pair(tree, children)?;
                Ok(a * b)
            }
            Operator::Divide => {
                let (a, b) = self.eval_pair(tree, children)?;
                if b == 0.0 {
                    tracing::debug!(dividend = a, "division by zero");
                    return Ok(f64::NAN);
                }
                Ok(a / b)
            }
            Operator::RangeSum => self.eval_range_sum(tree, children),
            Operator::Assign => self.eval_assign(tree, children),
            Operator::Min => Ok(self
                .eval_operands(tree, children)?
                .map_or(f64::NAN, |values| values.into_iter().fold(f64::INFINITY, f64::min))),
            Operator::Max => Ok(self
                .eval_operands(tree, children)?
                .map_or(f64::NAN, |values| {
                    values.into_iter().fold(f64::NEG_INFINITY, f64::max)
                })),
            Operator::Average => Ok(self
                .eval_operands(tree, children)?
                .map_or(f64::NAN, |values| average(&values))),
            Operator::Median => Ok(self
                .eval_operands(tree, children)?
                .map_or(f64::NAN, median)),
            Operator::Group => self.evaluate_node(tree, children[0]),
        }
    }

    fn eval_terminal(&self, token: &str) -> Result<f64> {
        if is_name(token) {
            return Ok(self.env.get(token).unwrap_or_else(|| {
                tracing::debug!(name = token, "unbound variable");
                f64::NAN
            }));
        }
        if is_number(token) {
            return token.parse::<f64>().map_err(|_| Error::InvalidTerminal {
                token: token.to_string(),
            });
        }
        Err(Error::InvalidTerminal {
            token: token.to_string(),
        })
    }

    fn eval_pair(&mut self, tree: &ExprTree, children: &[NodeId]) -> Result<(f64, f64)> {
        let a = self.evaluate_node(tree, children[0])?;
        let b = self.evaluate_node(tree, children[1])?;
        Ok((a, b))
    }

    /// Evaluates operands left to right, stopping at the first NaN
    fn eval_operands(&mut self, tree: &ExprTree, children: &[NodeId]) -> Result<Option<Vec<f64>>> {
        let mut values = Vec::with_capacity(children.len());
        for &child in children {
            let value = self.evaluate_node(tree, child)?;
            if value.is_nan() {
                return Ok(None);
            }
            values.push(value);
        }
        Ok(Some(values))
    }

    /// `($ a b)`: a + (a+1) + ... + b
    fn eval_range_sum(&mut self, tree: &ExprTree, children: &[NodeId]) -> Result<f64> {
        let (a, b) = self.eval_pair(tree, children)?;
        match (as_integer(a), as_integer(b)) {
            (Some(start), Some(end)) if start <= end => Ok(range_sum(start, end)),
            _ => {
                tracing::debug!(start = a, end = b, "invalid range");
                Ok(f64::NAN)
            }
        }
    }

    /// `(= name value)`: binds only when the value is not NaN
    fn eval_assign(&mut self, tree: &ExprTree, children: &[NodeId]) -> Result<f64> {
        let target = children[0];
        let name = tree.token(target);
        if tree.has_children(target) || !is_name(name) {
            return Err(Error::InvalidAssignmentTarget {
                token: name.to_string(),
            });
        }

        let value = self.evaluate_node(tree, children[1])?;
        if value.is_nan() {
            tracing::debug!(name, "assignment skipped, value is NaN");
            return Ok(value);
        }

        tracing::debug!(name, value, "assign");
        self.env.set(name, value);
        Ok(value)
    }
}

/// Evaluates `expr` against `env`
pub fn evaluate(expr: &Expression, env: &mut Environment) -> Result<f64> {
    Evaluator::new(env).evaluate(expr)
}

/// Number literals are non-empty runs of ASCII digits
fn is_number(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Rounds to the nearest integer if `value` is (almost) integral and fits in i64
fn as_integer(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    if (rounded - value).abs() > INTEGRALITY_TOLERANCE {
        return None;
    }
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}

/// Closed form of the inclusive integer range sum, `start <= end`
fn range_sum(start: i64, end: i64) -> f64 {
    let (a, b) = (start as i128, end as i128);
    let (sum, count) = (a + b, b - a + 1);
    // Exactly one factor is even; halve it before multiplying
    let (x, y) = if sum % 2 == 0 {
        (sum / 2, count)
    } else {
        (sum, count / 2)
    };
    x.checked_mul(y)
        .map_or_else(|| x as f64 * y as f64, |product| product as f64)
}

fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

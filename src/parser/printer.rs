//! Rendering parsed expressions back to text
//!
//! - [`Display`](std::fmt::Display) on [`Expression`] produces the bracketed
//!   form accepted by the parser
//! - [`to_infix`] produces conventional infix notation for transcripts
//! - [`NodeView`] serializes a subtree as nested `{token, children}` objects

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

use super::tree::{ExprTree, Expression, NodeId};
use crate::error::{Error, Result};

/// Tokens rendered between (or in front of) their operands
const INFIX_OPERATORS: &[&str] = &["+", "-", "*", "/", "$", "="];

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_bracketed(self.tree(), self.root(), f)
    }
}

fn write_bracketed(tree: &ExprTree, id: NodeId, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "({}", tree.token(id))?;
    for &child in tree.children(id) {
        write_bracketed(tree, child, f)?;
    }
    write!(f, ")")
}

/// Renders `expr` in infix notation, e.g. `(+(1)(2))` as `(1+2)`
///
/// Function-style nodes such as `min` render as `(min(1,2))`.
pub fn to_infix(expr: &Expression) -> Result<String> {
    let mut out = String::new();
    write_infix(expr.tree(), expr.root(), &mut out)?;
    Ok(out)
}

fn write_infix(tree: &ExprTree, id: NodeId, out: &mut String) -> Result<()> {
    let token = tree.token(id);
    let children = tree.children(id);

    if children.is_empty() {
        if tree.is_root(id) {
            out.push('(');
            out.push_str(token);
            out.push(')');
        } else {
            out.push_str(token);
        }
        return Ok(());
    }

    if INFIX_OPERATORS.contains(&token) {
        match children {
            [operand] => {
                out.push('(');
                out.push_str(token);
                write_infix(tree, *operand, out)?;
                out.push(')');
            }
            [left, right] => {
                out.push('(');
                write_infix(tree, *left, out)?;
                out.push_str(token);
                write_infix(tree, *right, out)?;
                out.push(')');
            }
            _ => return Err(Error::arity(token, "1 or 2", children.len())),
        }
        return Ok(());
    }

    out.push('(');
    out.push_str(token);
    out.push('(');
    for (i, &child) in children.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_infix(tree, child, out)?;
    }
    out.push_str("))");
    Ok(())
}

/// Borrowed, serializable view of one node and its subtree
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    tree: &'a ExprTree,
    id: NodeId,
}

impl<'a> NodeView<'a> {
    pub fn new(tree: &'a ExprTree, id: NodeId) -> Self {
        NodeView { tree, id }
    }

    /// View of the whole expression
    pub fn of(expr: &'a Expression) -> Self {
        NodeView::new(expr.tree(), expr.root())
    }
}

struct ChildViews<'a>(NodeView<'a>);

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 2)?;
        state.serialize_field("token", self.tree.token(self.id))?;
        state.serialize_field("children", &ChildViews(*self))?;
        state.end()
    }
}

impl Serialize for ChildViews<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let NodeView { tree, id } = self.0;
        serializer.collect_seq(
            tree.children(id)
                .iter()
                .map(|&child| NodeView::new(tree, child)),
        )
    }
}

use super::tree::{ExprTree, Expression, NodeId};
use crate::error::{Error, Result};

/// Recursive-descent parser for bracketed prefix expressions
///
/// Grammar: `expr := "(" head expr* ")"` where `head` is the maximal run of
/// characters up to the next `(` or `)`. Heads are not checked here; deciding
/// whether a head is a number, a name or an operator is left to evaluation.
pub struct SExprParser {
    /// Source as character vector
    source: Vec<char>,
    /// Current position in source
    current: usize,
    tree: ExprTree,
}

impl SExprParser {
    /// Creates a parser over one line of input
    pub fn new(source: &str) -> Self {
        SExprParser {
            source: source.chars().collect(),
            current: 0,
            tree: ExprTree::new(),
        }
    }

    /// Parses exactly one expression spanning the whole input
    pub fn parse(mut self) -> Result<Expression> {
        let root = self.parse_expression()?;

        if !self.is_at_end() {
            return Err(Error::TrailingInput {
                position: self.current,
            });
        }

        tracing::trace!(
            nodes = self.tree.node_count(),
            token = self.tree.token(root),
            "parsed expression"
        );
        Ok(Expression::new(self.tree, root))
    }

    /// Parses one node and its children, leaving the cursor just past its `)`
    fn parse_expression(&mut self) -> Result<NodeId> {
        if self.is_at_end() {
            return Err(Error::UnterminatedExpression {
                position: self.current,
            });
        }
        if self.peek() != '(' {
            return Err(Error::ExpectedOpenParen {
                position: self.current,
            });
        }
        self.advance();

        let head = self.scan_head()?;
        let node = self.tree.create(head);

        while self.peek() == '(' {
            let child = self.parse_expression()?;
            self.tree.add_child(node, child);
        }

        if self.is_at_end() {
            return Err(Error::UnterminatedExpression {
                position: self.current,
            });
        }
        if self.peek() != ')' {
            return Err(Error::UnexpectedChar {
                found: self.peek(),
                position: self.current,
            });
        }
        self.advance();

        Ok(node)
    }

    /// Consumes the head token, stopping before the next parenthesis
    fn scan_head(&mut self) -> Result<String> {
        let start = self.current;
        while !self.is_at_end() && !matches!(self.peek(), '(' | ')') {
            self.advance();
        }
        if self.is_at_end() {
            return Err(Error::UnterminatedExpression {
                position: self.current,
            });
        }
        Ok(self.source[start..self.current].iter().collect())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }
}

/// Parses `source` into an [`Expression`]
pub fn parse(source: &str) -> Result<Expression> {
    SExprParser::new(source).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_of_children(expr: &Expression) -> Vec<String> {
        let tree = expr.tree();
        tree.children(expr.root())
            .iter()
            .map(|&c| tree.token(c).to_string())
            .collect()
    }

    #[test]
    fn test_empty_parens() {
        let expr = parse("()").unwrap();
        let tree = expr.tree();
        assert!(tree.is_root(expr.root()));
        assert!(!tree.has_children(expr.root()));
        assert_eq!(expr.token(), "");
    }

    #[test]
    fn test_terminal() {
        let expr = parse("(123)").unwrap();
        assert!(!expr.tree().has_children(expr.root()));
        assert_eq!(expr.token(), "123");
    }

    #[test]
    fn test_nested_children() {
        let expr = parse("(f1(a1)(a2)(f2(a3)(a4)))").unwrap();
        let tree = expr.tree();
        let root = expr.root();

        assert_eq!(expr.token(), "f1");
        assert_eq!(tokens_of_children(&expr), vec!["a1", "a2", "f2"]);

        let subtree = tree.child(root, 2);
        assert!(tree.has_children(subtree));
        assert_eq!(tree.token(tree.child(subtree, 0)), "a3");
        assert_eq!(tree.token(tree.child(subtree, 1)), "a4");
        assert_eq!(tree.parent(subtree), Some(root));
    }

    #[test]
    fn test_grouping_wrapper() {
        let expr = parse("((a))").unwrap();
        let tree = expr.tree();
        assert_eq!(expr.token(), "");
        assert_eq!(tree.child_count(expr.root()), 1);
        assert_eq!(tree.token(tree.first_child(expr.root()).unwrap()), "a");
    }

    #[test]
    fn test_head_keeps_arbitrary_characters() {
        let expr = parse("(<>)").unwrap();
        assert_eq!(expr.token(), "<>");
        assert!(expr.is_end_command());

        let expr = parse("(median(1))").unwrap();
        assert_eq!(expr.token(), "median");

        let expr = parse("(a b)").unwrap();
        assert_eq!(expr.token(), "a b");
    }

    #[test]
    fn test_unterminated() {
        assert!(matches!(
            parse("(+(1)"),
            Err(Error::UnterminatedExpression { .. })
        ));
        assert!(matches!(
            parse("(abc"),
            Err(Error::UnterminatedExpression { position: 4 })
        ));
        assert!(matches!(
            parse("("),
            Err(Error::UnterminatedExpression { .. })
        ));
    }

    #[test]
    fn test_trailing_input() {
        assert_eq!(parse("(1))"), Err(Error::TrailingInput { position: 3 }));
        assert!(matches!(
            parse("(1)(2)"),
            Err(Error::TrailingInput { position: 3 })
        ));
        assert!(matches!(parse("(1) "), Err(Error::TrailingInput { .. })));
    }

    #[test]
    fn test_missing_open_paren() {
        assert_eq!(parse(""), Err(Error::UnterminatedExpression { position: 0 }));
        assert_eq!(parse("5"), Err(Error::ExpectedOpenParen { position: 0 }));
        assert_eq!(parse(")"), Err(Error::ExpectedOpenParen { position: 0 }));
    }

    #[test]
    fn test_garbage_between_children() {
        assert_eq!(
            parse("(+(1) (2))"),
            Err(Error::UnexpectedChar {
                found: ' ',
                position: 5
            })
        );
        assert!(matches!(
            parse("(+(1)x)"),
            Err(Error::UnexpectedChar { found: 'x', .. })
        ));
    }
}

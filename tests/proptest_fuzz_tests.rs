//! Property-based tests for the lispcalc parser and evaluator
//!
//! These tests use proptest to generate random inputs and verify that:
//! 1. The parser never panics on arbitrary input
//! 2. Printing a parsed tree and parsing it again gives the same tree
//! 3. NaN operands always make reducers NaN
//! 4. Evaluation is deterministic

use lispcalc::{evaluate, parse, Environment, ExprTree, Expression, NodeId};
use proptest::prelude::*;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Generate random strings that might break the parser
fn arbitrary_source_string() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[\x00-\x7F]{0,200}").unwrap()
}

/// Generate strings made mostly of parentheses
fn paren_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("(".to_string()),
            Just(")".to_string()),
            Just("+".to_string()),
            Just("1".to_string()),
            Just("x".to_string()),
        ],
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

/// A tree shape: token plus children
#[derive(Debug, Clone)]
struct Shape {
    token: String,
    children: Vec<Shape>,
}

fn shape() -> impl Strategy<Value = Shape> {
    let token = "[a-z0-9+*/$=<> -]{0,6}";
    let leaf = token.prop_map(|token| Shape {
        token,
        children: Vec::new(),
    });
    leaf.prop_recursive(4, 32, 4, move |inner| {
        (token, prop::collection::vec(inner, 0..4))
            .prop_map(|(token, children)| Shape { token, children })
    })
}

fn bracketed(shape: &Shape) -> String {
    let children: String = shape.children.iter().map(bracketed).collect();
    format!("({}{})", shape.token, children)
}

fn matches_shape(tree: &ExprTree, id: NodeId, shape: &Shape) -> bool {
    tree.token(id) == shape.token
        && tree.child_count(id) == shape.children.len()
        && tree
            .children(id)
            .iter()
            .zip(&shape.children)
            .all(|(&child, expected)| matches_shape(tree, child, expected))
}

/// Generate valid arithmetic over small integers
fn arith_expr() -> impl Strategy<Value = String> {
    let leaf = (0u32..50).prop_map(|n| format!("({})", n));
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")], inner.clone(), inner.clone())
                .prop_map(|(op, a, b)| format!("({}{}{})", op, a, b)),
            inner.clone().prop_map(|a| format!("(-{})", a)),
            (
                prop_oneof![Just("min"), Just("max"), Just("average"), Just("median")],
                prop::collection::vec(inner, 1..5)
            )
                .prop_map(|(op, args)| format!("({}{})", op, args.concat())),
        ]
    })
}

fn nan_operand() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(/(1)(0))".to_string()),
        Just("(unbound)".to_string()),
        Just("($(5)(1))".to_string()),
    ]
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn parser_never_panics_on_arbitrary_input(source in arbitrary_source_string()) {
        let _ = parse(&source);
    }

    #[test]
    fn parser_never_panics_on_paren_soup(source in paren_soup()) {
        let _ = parse(&source);
    }

    #[test]
    fn evaluator_never_panics_on_parsed_soup(source in paren_soup()) {
        if let Ok(expr) = parse(&source) {
            let _ = evaluate(&expr, &mut Environment::new());
        }
    }

    #[test]
    fn parse_is_left_inverse_of_print(shape in shape()) {
        let source = bracketed(&shape);
        let expr = parse(&source).unwrap();
        prop_assert!(matches_shape(expr.tree(), expr.root(), &shape));

        let printed = expr.to_string();
        prop_assert_eq!(&printed, &source);
        let reparsed: Expression = parse(&printed).unwrap();
        prop_assert_eq!(reparsed, expr);
    }

    #[test]
    fn negative_child_index_counts_from_end(shape in shape()) {
        let expr = parse(&bracketed(&shape)).unwrap();
        let tree = expr.tree();
        let root = expr.root();
        let count = tree.child_count(root) as isize;
        for index in 0..count {
            prop_assert_eq!(tree.child(root, index - count), tree.child(root, index));
        }
        prop_assert_eq!(tree.last_child(root), tree.children(root).last().copied());
    }

    #[test]
    fn reducers_are_nan_if_any_operand_is_nan(
        op in prop_oneof![Just("min"), Just("max"), Just("average"), Just("median")],
        values in prop::collection::vec(0u32..1000, 0..6),
        position in 0usize..7,
        bad in nan_operand(),
    ) {
        let mut operands: Vec<String> = values.iter().map(|v| format!("({})", v)).collect();
        let position = position.min(operands.len());
        operands.insert(position, bad);

        let source = format!("({}{})", op, operands.concat());
        let expr = parse(&source).unwrap();
        let result = evaluate(&expr, &mut Environment::new()).unwrap();
        prop_assert!(result.is_nan());
    }

    #[test]
    fn reducers_agree_with_sorted_values(values in prop::collection::vec(0u32..1000, 1..8)) {
        let operands: String = values.iter().map(|v| format!("({})", v)).collect();
        let mut env = Environment::new();
        let run = |op: &str, env: &mut Environment| {
            evaluate(&parse(&format!("({}{})", op, operands)).unwrap(), env).unwrap()
        };

        let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        sorted.sort_by(f64::total_cmp);

        prop_assert_eq!(run("min", &mut env), sorted[0]);
        prop_assert_eq!(run("max", &mut env), sorted[sorted.len() - 1]);
        let median = run("median", &mut env);
        prop_assert!(median >= sorted[0] && median <= sorted[sorted.len() - 1]);
    }

    #[test]
    fn range_sum_matches_iteration(a in -500i64..500, b in -500i64..500) {
        let operand = |n: i64| if n < 0 { format!("(-({}))", -n) } else { format!("({})", n) };
        let source = format!("(${}{})", operand(a), operand(b));
        let result = evaluate(&parse(&source).unwrap(), &mut Environment::new()).unwrap();
        if a > b {
            prop_assert!(result.is_nan());
        } else {
            prop_assert_eq!(result, (a..=b).sum::<i64>() as f64);
        }
    }

    #[test]
    fn evaluation_is_deterministic(source in arith_expr()) {
        let expr = parse(&source).unwrap();
        let first = evaluate(&expr, &mut Environment::new()).unwrap();
        let second = evaluate(&expr, &mut Environment::new()).unwrap();
        prop_assert!(first == second || (first.is_nan() && second.is_nan()));
    }
}

#[test]
fn generated_arithmetic_is_well_formed() {
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    let mut runner = TestRunner::default();
    for _ in 0..50 {
        let source = arith_expr().new_tree(&mut runner).unwrap().current();
        let expr = parse(&source).unwrap();
        assert!(evaluate(&expr, &mut Environment::new()).is_ok(), "{}", source);
    }
}

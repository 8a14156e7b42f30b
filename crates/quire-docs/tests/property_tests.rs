//! Property-based tests for the expression evaluator and type classifier.

use proptest::prelude::*;
use quire_docs::eval::{ExpressionNode, format_number};
use quire_docs::{TypeClass, TypedValue, Value, classify_type, evaluate_value};

fn leaf_strategy() -> impl Strategy<Value = ExpressionNode> {
    prop_oneof![
        "[a-z ]{0,8}".prop_map(ExpressionNode::string),
        (-1000i32..1000).prop_map(|n| ExpressionNode::number(f64::from(n))),
        any::<bool>().prop_map(ExpressionNode::boolean),
        Just(ExpressionNode::null()),
        Just(ExpressionNode::This),
        Just(ExpressionNode::ident("undefined")),
        "[a-z]{1,6}".prop_map(ExpressionNode::ident),
        Just(ExpressionNode::regex("/x+/g")),
        Just(ExpressionNode::other("CallExpression")),
    ]
}

fn expression_strategy() -> impl Strategy<Value = ExpressionNode> {
    let operators = prop::sample::select(vec!["+", "-", "*", "===", "<", "in", "instanceof"]);
    let unary = prop::sample::select(vec!["!", "-", "typeof", "void"]);
    let logical = prop::sample::select(vec!["&&", "||"]);
    leaf_strategy().prop_recursive(4, 32, 4, move |inner| {
        prop_oneof![
            (operators.clone(), inner.clone(), inner.clone())
                .prop_map(|(op, l, r)| ExpressionNode::binary(op, l, r)),
            (logical.clone(), inner.clone(), inner.clone())
                .prop_map(|(op, l, r)| ExpressionNode::logical(op, l, r)),
            (unary.clone(), inner.clone()).prop_map(|(op, arg)| ExpressionNode::unary(op, arg)),
            prop::collection::vec(inner.clone(), 0..4).prop_map(ExpressionNode::array),
            (inner, "[a-z]{1,6}").prop_map(|(object, prop)| ExpressionNode::member(object, &prop)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Joining two string literals yields their concatenation.
    #[test]
    fn prop_string_concatenation(a in "[a-zA-Z0-9 ]{0,12}", b in "[a-zA-Z0-9 ]{0,12}") {
        let node = ExpressionNode::binary("+", ExpressionNode::string(a.clone()), ExpressionNode::string(b.clone()));
        prop_assert_eq!(evaluate_value(&node).unwrap(), Value::string(format!("{a}{b}")));
        prop_assert_eq!(classify_type(&node), TypeClass::String);
    }

    /// A number joined to a string is printed without a fractional part.
    #[test]
    fn prop_string_number_concatenation(a in "[a-z]{0,8}", n in -100_000i64..100_000) {
        let number = ExpressionNode::number(n as f64);
        let node = ExpressionNode::binary("+", ExpressionNode::string(a.clone()), number.clone());
        prop_assert_eq!(evaluate_value(&node).unwrap(), Value::string(format!("{a}{n}")));

        let reversed = ExpressionNode::binary("+", number, ExpressionNode::string(a.clone()));
        prop_assert_eq!(evaluate_value(&reversed).unwrap(), Value::string(format!("{}{a}", format_number(n as f64))));
    }

    /// Adding two numbers stays numeric.
    #[test]
    fn prop_number_addition(a in -1000i32..1000, b in -1000i32..1000) {
        let node = ExpressionNode::binary(
            "+",
            ExpressionNode::number(f64::from(a)),
            ExpressionNode::number(f64::from(b)),
        );
        prop_assert_eq!(evaluate_value(&node).unwrap(), Value::number(f64::from(a + b)));
    }

    /// Whenever an expression evaluates, its classification names the kind
    /// of the value it evaluated to.
    #[test]
    fn prop_classification_agrees_with_evaluation(node in expression_strategy()) {
        let class = classify_type(&node);
        if matches!(node, ExpressionNode::This) {
            prop_assert_eq!(class, TypeClass::ThisRef);
        }
        if let Ok(value) = evaluate_value(&node) {
            let expected = match value {
                Value::Typed(TypedValue::String(_)) => TypeClass::String,
                Value::Typed(TypedValue::Boolean(_)) => TypeClass::Boolean,
                Value::Typed(TypedValue::Regex(_)) => TypeClass::Regexp,
                Value::Typed(TypedValue::Number(_))
                | Value::Unclassified(_)
                | Value::Array(_)
                | Value::Object(_) => TypeClass::Other,
            };
            prop_assert_eq!(class, expected, "{:?}", node);
        }
    }

    /// A `!` in front of anything is a boolean.
    #[test]
    fn prop_negation_is_boolean(node in expression_strategy()) {
        prop_assert_eq!(classify_type(&ExpressionNode::unary("!", node)), TypeClass::Boolean);
    }
}

use indexmap::IndexMap;

use super::error::{EvalError, EvalResult};
use super::node::{ExpressionNode, Literal, LiteralValue};
use super::value::{TypedValue, Value};

/// Value `Ext.baseCSSPrefix` has in every supported framework release.
const BASE_CSS_PREFIX: &str = "x-";

/// Reduces an expression to a concrete value.
///
/// Supports literals, array and object literals, `+` over strings and
/// numbers, and the `Ext.baseCSSPrefix` constant. Anything else (function
/// expressions, variable references, calls...) is an `EvalError`.
pub fn evaluate_value(node: &ExpressionNode) -> EvalResult<Value> {
    match node {
        ExpressionNode::Array { elements } => elements
            .iter()
            .map(evaluate_value)
            .collect::<EvalResult<Vec<_>>>()
            .map(Value::Array),
        ExpressionNode::Object { entries } => {
            let mut map = IndexMap::with_capacity(entries.len());
            for entry in entries {
                let key = key_value(&entry.key)?;
                let value = evaluate_value(&entry.value)?;
                map.insert(key, value);
            }
            Ok(Value::Object(map))
        }
        ExpressionNode::Binary {
            operator,
            left,
            right,
        } => {
            if operator != "+" {
                return Err(EvalError::UnsupportedOperator(operator.clone()));
            }
            concat(evaluate_value(left)?, evaluate_value(right)?)
        }
        ExpressionNode::Member { .. } => {
            if is_base_css_prefix(node) {
                Ok(Value::string(BASE_CSS_PREFIX))
            } else {
                Err(EvalError::UnsupportedMemberAccess)
            }
        }
        ExpressionNode::Literal(literal) => Ok(literal_value(literal)),
        other => Err(EvalError::UnknownNode(other.node_type().to_string())),
    }
}

fn literal_value(literal: &Literal) -> Value {
    if literal.raw.starts_with('/') {
        return Value::Typed(TypedValue::Regex(literal.raw.clone()));
    }
    match &literal.value {
        LiteralValue::String(s) => Value::string(s.clone()),
        LiteralValue::Number(n) => Value::number(*n),
        LiteralValue::Boolean(b) => Value::boolean(*b),
        LiteralValue::Regex(_) => Value::Typed(TypedValue::Regex(literal.raw.clone())),
        LiteralValue::Null => Value::Unclassified(literal.raw.clone()),
    }
}

fn concat(left: Value, right: Value) -> EvalResult<Value> {
    match (left, right) {
        (Value::Typed(TypedValue::String(l)), Value::Typed(TypedValue::String(r))) => {
            Ok(Value::string(l + &r))
        }
        (Value::Typed(TypedValue::Number(l)), Value::Typed(TypedValue::Number(r))) => {
            Ok(Value::number(l + r))
        }
        (
            Value::Typed(l @ TypedValue::String(_)),
            Value::Typed(r @ TypedValue::Number(_)),
        )
        | (
            Value::Typed(l @ TypedValue::Number(_)),
            Value::Typed(r @ TypedValue::String(_)),
        ) => Ok(Value::string(l.text() + &r.text())),
        (left, right) => Err(EvalError::UnsupportedOperands {
            left: kind_name(&left),
            right: kind_name(&right),
        }),
    }
}

fn kind_name(value: &Value) -> String {
    value.type_name().unwrap_or("unclassified").to_string()
}

/// Turns an object literal key into its string form.
fn key_value(key: &ExpressionNode) -> EvalResult<String> {
    match key {
        ExpressionNode::Identifier { name } => Ok(name.clone()),
        ExpressionNode::Literal(literal) => Ok(match &literal.value {
            LiteralValue::String(s) => s.clone(),
            _ => match literal_value(literal) {
                Value::Typed(typed) => typed.text(),
                _ => literal.raw.clone(),
            },
        }),
        other => Err(EvalError::UnsupportedKey(other.node_type().to_string())),
    }
}

/// True for the non-computed member access `Ext.baseCSSPrefix`.
fn is_base_css_prefix(node: &ExpressionNode) -> bool {
    matches!(
        node,
        ExpressionNode::Member { object, property, computed: false }
            if matches!(object.as_ref(), ExpressionNode::Identifier { name } if name == "Ext")
                && matches!(property.as_ref(), ExpressionNode::Identifier { name } if name == "baseCSSPrefix")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> ExpressionNode {
        ExpressionNode::string(value)
    }

    fn n(value: f64) -> ExpressionNode {
        ExpressionNode::number(value)
    }

    #[test]
    fn literals_keep_their_kind() {
        assert_eq!(evaluate_value(&s("foo")).unwrap(), Value::string("foo"));
        assert_eq!(evaluate_value(&n(42.0)).unwrap(), Value::number(42.0));
        assert_eq!(
            evaluate_value(&ExpressionNode::boolean(true)).unwrap(),
            Value::boolean(true)
        );
        assert_eq!(
            evaluate_value(&ExpressionNode::regex("/.*/")).unwrap(),
            Value::Typed(TypedValue::Regex("/.*/".to_string()))
        );
    }

    #[test]
    fn null_literal_is_unclassified() {
        let value = evaluate_value(&ExpressionNode::null()).unwrap();
        assert_eq!(value, Value::Unclassified("null".to_string()));
        assert_eq!(value.type_name(), None);
    }

    #[test]
    fn concatenation() {
        let cases = [
            (s("foo"), s("bar"), Value::string("foobar")),
            (s("foo"), n(7.0), Value::string("foo7")),
            (n(8.0), s("foo"), Value::string("8foo")),
            (n(1.0), n(2.0), Value::number(3.0)),
        ];
        for (left, right, expected) in cases {
            let node = ExpressionNode::binary("+", left, right);
            assert_eq!(evaluate_value(&node).unwrap(), expected);
        }
    }

    #[test]
    fn concatenation_of_other_kinds_fails() {
        let node = ExpressionNode::binary("+", s("foo"), ExpressionNode::boolean(true));
        assert!(matches!(
            evaluate_value(&node),
            Err(EvalError::UnsupportedOperands { .. })
        ));
        let node = ExpressionNode::binary("+", ExpressionNode::null(), n(1.0));
        assert!(evaluate_value(&node).is_err());
    }

    #[test]
    fn other_operators_fail() {
        let node = ExpressionNode::binary("-", n(3.0), n(1.0));
        assert_eq!(
            evaluate_value(&node).unwrap_err(),
            EvalError::UnsupportedOperator("-".to_string())
        );
    }

    #[test]
    fn arrays_and_objects() {
        let node = ExpressionNode::array(vec![s("a"), n(1.0)]);
        assert_eq!(
            evaluate_value(&node).unwrap(),
            Value::Array(vec![Value::string("a"), Value::number(1.0)])
        );

        let node = ExpressionNode::object(vec![
            (ExpressionNode::ident("width"), n(100.0)),
            (s("title"), s("Hello")),
            (n(5.0), ExpressionNode::boolean(false)),
        ]);
        let Value::Object(map) = evaluate_value(&node).unwrap() else {
            panic!("expected object");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["width", "title", "5"]);
        assert_eq!(map["title"], Value::string("Hello"));
    }

    #[test]
    fn failing_element_fails_the_array() {
        let node = ExpressionNode::array(vec![s("a"), ExpressionNode::ident("foo")]);
        assert_eq!(
            evaluate_value(&node).unwrap_err(),
            EvalError::UnknownNode("Identifier".to_string())
        );
    }

    #[test]
    fn base_css_prefix() {
        let node = ExpressionNode::member(ExpressionNode::ident("Ext"), "baseCSSPrefix");
        assert_eq!(evaluate_value(&node).unwrap(), Value::string("x-"));

        let concat = ExpressionNode::binary("+", node, s("panel"));
        assert_eq!(evaluate_value(&concat).unwrap(), Value::string("x-panel"));

        let other = ExpressionNode::member(ExpressionNode::ident("Ext"), "version");
        assert_eq!(
            evaluate_value(&other).unwrap_err(),
            EvalError::UnsupportedMemberAccess
        );
    }

    #[test]
    fn unknown_nodes_are_named() {
        let err = evaluate_value(&ExpressionNode::other("FunctionExpression")).unwrap_err();
        assert_eq!(err.to_string(), "unknown node type: FunctionExpression");
        assert!(evaluate_value(&ExpressionNode::This).is_err());
    }
}

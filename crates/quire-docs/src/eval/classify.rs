use super::node::{ExpressionNode, LiteralValue};
use super::value::TypeClass;

/// Unary and binary operators whose result is always a boolean.
const BOOLEAN_RETURNING_OPERATORS: &[&str] = &[
    "!",
    ">",
    ">=",
    "<",
    "<=",
    "==",
    "!=",
    "===",
    "!==",
    "in",
    "instanceof",
    "delete",
];

/// Classifies the JavaScript type an expression produces.
///
/// Never fails: anything that cannot be told statically is `TypeClass::Other`.
pub fn classify_type(node: &ExpressionNode) -> TypeClass {
    if is_undefined(node) || is_void(node) {
        TypeClass::Undefined
    } else if matches!(node, ExpressionNode::This) {
        TypeClass::ThisRef
    } else if is_boolean(node) {
        TypeClass::Boolean
    } else if is_string(node) {
        TypeClass::String
    } else if is_regexp(node) {
        TypeClass::Regexp
    } else {
        TypeClass::Other
    }
}

fn is_undefined(node: &ExpressionNode) -> bool {
    matches!(node, ExpressionNode::Identifier { name } if name == "undefined")
}

fn is_void(node: &ExpressionNode) -> bool {
    matches!(node, ExpressionNode::Unary { operator, .. } if operator == "void")
}

fn is_boolean(node: &ExpressionNode) -> bool {
    match node {
        ExpressionNode::Literal(literal) => matches!(literal.value, LiteralValue::Boolean(_)),
        ExpressionNode::Unary { operator, .. } | ExpressionNode::Binary { operator, .. } => {
            BOOLEAN_RETURNING_OPERATORS.contains(&operator.as_str())
        }
        ExpressionNode::Logical { left, right, .. } => is_boolean(left) && is_boolean(right),
        ExpressionNode::Conditional {
            consequent,
            alternate,
            ..
        } => is_boolean(consequent) && is_boolean(alternate),
        ExpressionNode::Assignment {
            operator, value, ..
        } => operator == "=" && is_boolean(value),
        _ => false,
    }
}

fn is_string(node: &ExpressionNode) -> bool {
    match node {
        ExpressionNode::Literal(literal) => matches!(literal.value, LiteralValue::String(_)),
        ExpressionNode::Binary {
            operator,
            left,
            right,
        } if operator == "+" => is_string(left) || is_string(right),
        ExpressionNode::Unary { operator, .. } => operator == "typeof",
        _ => false,
    }
}

fn is_regexp(node: &ExpressionNode) -> bool {
    matches!(node, ExpressionNode::Literal(literal) if literal.raw.starts_with('/'))
}

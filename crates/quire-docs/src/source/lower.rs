//! Lowering of oxc expressions into [`ExpressionNode`] trees.

use std::path::PathBuf;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrayExpressionElement, AssignmentTarget, Expression, ObjectPropertyKind, PropertyKey,
    Statement,
};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::{DocsError, Result};
use crate::eval::{ExpressionNode, Literal, LiteralValue};

/// Parses a standalone expression, e.g. the value list of an `@enum` tag.
pub fn parse_expression(text: &str) -> Result<ExpressionNode> {
    let source = format!("({text});");
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, &source, SourceType::cjs()).parse();

    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(|err| err.to_string()).collect();
        return Err(DocsError::parse_error(PathBuf::from("<expression>"), &messages));
    }

    match ret.program.body.first() {
        Some(Statement::ExpressionStatement(stmt)) if ret.program.body.len() == 1 => {
            Ok(lower_expression(&stmt.expression, &source))
        }
        _ => Err(DocsError::parse_error(
            PathBuf::from("<expression>"),
            &[format!("not a single expression: {text}")],
        )),
    }
}

/// Converts an oxc expression into an owned tree. `source` is the text the
/// expression was parsed from; literals keep their raw slice of it.
pub fn lower_expression(expr: &Expression<'_>, source: &str) -> ExpressionNode {
    match expr {
        Expression::BooleanLiteral(lit) => literal(lit.span.source_text(source), LiteralValue::Boolean(lit.value)),
        Expression::NullLiteral(lit) => literal(lit.span.source_text(source), LiteralValue::Null),
        Expression::NumericLiteral(lit) => literal(lit.span.source_text(source), LiteralValue::Number(lit.value)),
        Expression::StringLiteral(lit) => literal(
            lit.span.source_text(source),
            LiteralValue::String(lit.value.to_string()),
        ),
        Expression::RegExpLiteral(lit) => {
            let raw = lit.span.source_text(source);
            literal(raw, LiteralValue::Regex(raw.to_string()))
        }
        Expression::Identifier(ident) => ExpressionNode::ident(ident.name.as_str()),
        Expression::ThisExpression(_) => ExpressionNode::This,
        Expression::ParenthesizedExpression(paren) => lower_expression(&paren.expression, source),
        Expression::ArrayExpression(array) => ExpressionNode::Array {
            elements: array
                .elements
                .iter()
                .map(|element| match element {
                    ArrayExpressionElement::SpreadElement(_) => ExpressionNode::other("SpreadElement"),
                    ArrayExpressionElement::Elision(_) => ExpressionNode::other("Elision"),
                    other => match other.as_expression() {
                        Some(expr) => lower_expression(expr, source),
                        None => ExpressionNode::other("ArrayElement"),
                    },
                })
                .collect(),
        },
        Expression::ObjectExpression(object) => ExpressionNode::object(
            object
                .properties
                .iter()
                .map(|property| match property {
                    ObjectPropertyKind::ObjectProperty(prop) => (
                        lower_property_key(&prop.key, source),
                        lower_expression(&prop.value, source),
                    ),
                    ObjectPropertyKind::SpreadProperty(spread) => (
                        ExpressionNode::other("SpreadElement"),
                        lower_expression(&spread.argument, source),
                    ),
                })
                .collect(),
        ),
        Expression::BinaryExpression(binary) => ExpressionNode::binary(
            binary.operator.as_str(),
            lower_expression(&binary.left, source),
            lower_expression(&binary.right, source),
        ),
        Expression::LogicalExpression(logical) => ExpressionNode::logical(
            logical.operator.as_str(),
            lower_expression(&logical.left, source),
            lower_expression(&logical.right, source),
        ),
        Expression::UnaryExpression(unary) => {
            ExpressionNode::unary(unary.operator.as_str(), lower_expression(&unary.argument, source))
        }
        Expression::ConditionalExpression(cond) => ExpressionNode::Conditional {
            test: Box::new(lower_expression(&cond.test, source)),
            consequent: Box::new(lower_expression(&cond.consequent, source)),
            alternate: Box::new(lower_expression(&cond.alternate, source)),
        },
        Expression::AssignmentExpression(assign) => ExpressionNode::Assignment {
            operator: assign.operator.as_str().to_string(),
            target: Box::new(lower_assignment_target(&assign.left, source)),
            value: Box::new(lower_expression(&assign.right, source)),
        },
        Expression::StaticMemberExpression(member) => {
            ExpressionNode::member(lower_expression(&member.object, source), member.property.name.as_str())
        }
        Expression::ComputedMemberExpression(member) => ExpressionNode::Member {
            object: Box::new(lower_expression(&member.object, source)),
            property: Box::new(lower_expression(&member.expression, source)),
            computed: true,
        },
        other => ExpressionNode::other(expression_type_name(other)),
    }
}

/// Dotted name of an identifier or static member chain (`Ext.form.Panel`).
pub fn member_path(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(ident) => Some(ident.name.to_string()),
        Expression::ThisExpression(_) => Some("this".to_string()),
        Expression::StaticMemberExpression(member) => {
            let object = member_path(&member.object)?;
            Some(format!("{object}.{}", member.property.name))
        }
        Expression::ParenthesizedExpression(paren) => member_path(&paren.expression),
        _ => None,
    }
}

/// Key text of a non-computed property, as written.
pub fn property_key_name(key: &PropertyKey<'_>) -> Option<String> {
    key.static_name().map(|name| name.to_string())
}

fn lower_property_key(key: &PropertyKey<'_>, source: &str) -> ExpressionNode {
    match key {
        PropertyKey::StaticIdentifier(ident) => ExpressionNode::ident(ident.name.as_str()),
        PropertyKey::PrivateIdentifier(_) => ExpressionNode::other("PrivateIdentifier"),
        other => match other.as_expression() {
            Some(expr) => lower_expression(expr, source),
            None => ExpressionNode::other("PropertyKey"),
        },
    }
}

fn lower_assignment_target(target: &AssignmentTarget<'_>, source: &str) -> ExpressionNode {
    match target {
        AssignmentTarget::AssignmentTargetIdentifier(ident) => ExpressionNode::ident(ident.name.as_str()),
        AssignmentTarget::StaticMemberExpression(member) => {
            ExpressionNode::member(lower_expression(&member.object, source), member.property.name.as_str())
        }
        AssignmentTarget::ComputedMemberExpression(member) => ExpressionNode::Member {
            object: Box::new(lower_expression(&member.object, source)),
            property: Box::new(lower_expression(&member.expression, source)),
            computed: true,
        },
        _ => ExpressionNode::other("AssignmentTargetPattern"),
    }
}

fn literal(raw: &str, value: LiteralValue) -> ExpressionNode {
    ExpressionNode::Literal(Literal {
        raw: raw.to_string(),
        value,
    })
}

fn expression_type_name(expr: &Expression<'_>) -> &'static str {
    match expr {
        Expression::FunctionExpression(_) => "FunctionExpression",
        Expression::ArrowFunctionExpression(_) => "ArrowFunctionExpression",
        Expression::CallExpression(_) => "CallExpression",
        Expression::NewExpression(_) => "NewExpression",
        Expression::ClassExpression(_) => "ClassExpression",
        Expression::TemplateLiteral(_) => "TemplateLiteral",
        Expression::TaggedTemplateExpression(_) => "TaggedTemplateExpression",
        Expression::SequenceExpression(_) => "SequenceExpression",
        Expression::UpdateExpression(_) => "UpdateExpression",
        Expression::BigIntLiteral(_) => "BigIntLiteral",
        Expression::ChainExpression(_) => "ChainExpression",
        Expression::AwaitExpression(_) => "AwaitExpression",
        Expression::YieldExpression(_) => "YieldExpression",
        Expression::PrivateFieldExpression(_) => "PrivateFieldExpression",
        Expression::Super(_) => "Super",
        _ => "Expression",
    }
}

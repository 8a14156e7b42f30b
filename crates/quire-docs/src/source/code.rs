//! Detection of the code that follows each doc comment.

use oxc_ast::ast::{
    ArrowFunctionExpression, AssignmentExpression, AssignmentTarget, BindingPatternKind,
    CallExpression, Expression, Function, FunctionBody, ObjectExpression, ObjectProperty,
    ObjectPropertyKind, ReturnStatement, VariableDeclaration,
};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::ScopeFlags;
use rustc_hash::FxHashMap;

use super::lower::{lower_expression, member_path, property_key_name};
use crate::eval::{ExpressionNode, Value, evaluate_value};

/// What a doc comment documents, as far as the code tells.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeInfo {
    /// `Ext.define('Name', {...})`
    ExtDefine(ExtDefineInfo),
    Function(FunctionInfo),
    Value(ValueInfo),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtDefineInfo {
    pub name: String,
    pub extends: Option<String>,
    pub mixins: Vec<String>,
    pub requires: Vec<String>,
    pub override_target: Option<String>,
    pub singleton: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionInfo {
    pub name: String,
    /// Object part of a dotted assignment target (`Foo.Bar` in `Foo.Bar.baz = function`).
    pub owner: Option<String>,
    pub params: Vec<String>,
    pub return_expressions: Vec<ExpressionNode>,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueInfo {
    pub name: String,
    pub owner: Option<String>,
    pub value: Option<ExpressionNode>,
    /// Declared inside an `Ext.define` `config` block.
    pub in_config: bool,
    /// Declared inside a `statics` block.
    pub is_static: bool,
}

impl CodeInfo {
    pub fn name(&self) -> &str {
        match self {
            Self::ExtDefine(info) => &info.name,
            Self::Function(info) => &info.name,
            Self::Value(info) => &info.name,
        }
    }

    /// Owner-qualified name, e.g. `My.Enum` for `My.Enum = {...}`.
    pub fn full_name(&self) -> String {
        let owner = match self {
            Self::ExtDefine(_) => None,
            Self::Function(info) => info.owner.as_deref(),
            Self::Value(info) => info.owner.as_deref(),
        };
        match owner {
            Some(owner) => format!("{owner}.{}", self.name()),
            None => self.name().to_string(),
        }
    }
}

/// Block of an `Ext.define` body whose members get special treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyBlock {
    Config,
    Statics,
}

/// Walks a program and records the code found at every node start offset.
///
/// Doc comments carry the offset of the token that follows them, so a
/// lookup by that offset finds the documented code. The outermost node
/// starting at an offset wins.
pub struct CodeCollector<'s> {
    source: &'s str,
    found: FxHashMap<u32, CodeInfo>,
}

impl<'s> CodeCollector<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            found: FxHashMap::default(),
        }
    }

    pub fn into_map(self) -> FxHashMap<u32, CodeInfo> {
        self.found
    }

    fn record(&mut self, offset: u32, info: CodeInfo) {
        self.found.entry(offset).or_insert(info);
    }

    fn ext_define(&mut self, call: &CallExpression<'_>) -> bool {
        let is_define = matches!(
            member_path(&call.callee).as_deref(),
            Some("Ext.define")
        );
        if !is_define {
            return false;
        }
        let Some(name) = call
            .arguments
            .first()
            .and_then(|arg| arg.as_expression())
            .and_then(string_value)
        else {
            return false;
        };

        let mut info = ExtDefineInfo {
            name,
            ..ExtDefineInfo::default()
        };
        let body = call.arguments.get(1).and_then(|arg| arg.as_expression());
        if let Some(Expression::ObjectExpression(body)) = body {
            self.read_define_body(body, &mut info);
        }
        self.record(call.span.start, CodeInfo::ExtDefine(info));
        true
    }

    fn read_define_body(&mut self, body: &ObjectExpression<'_>, info: &mut ExtDefineInfo) {
        for property in body.properties.iter() {
            let ObjectPropertyKind::ObjectProperty(prop) = property else {
                continue;
            };
            let Some(key) = property_key_name(&prop.key) else {
                continue;
            };
            match key.as_str() {
                "extend" => info.extends = string_value(&prop.value),
                "override" => info.override_target = string_value(&prop.value),
                "mixins" => info.mixins = string_list(&prop.value, self.source),
                "requires" => info.requires = string_list(&prop.value, self.source),
                "singleton" => {
                    info.singleton = matches!(&prop.value, Expression::BooleanLiteral(lit) if lit.value);
                }
                "config" => self.read_block(&prop.value, BodyBlock::Config),
                "statics" | "inheritableStatics" => self.read_block(&prop.value, BodyBlock::Statics),
                _ => {}
            }
        }
    }

    /// Records members of a `config` or `statics` block before the regular
    /// walk reaches them.
    fn read_block(&mut self, value: &Expression<'_>, block: BodyBlock) {
        let Expression::ObjectExpression(object) = value else {
            return;
        };
        for property in object.properties.iter() {
            let ObjectPropertyKind::ObjectProperty(prop) = property else {
                continue;
            };
            if let Some(mut info) = self.property_info(prop) {
                match (&mut info, block) {
                    (CodeInfo::Value(value), BodyBlock::Config) => value.in_config = true,
                    (CodeInfo::Value(value), BodyBlock::Statics) => value.is_static = true,
                    (CodeInfo::Function(function), BodyBlock::Statics) => function.is_static = true,
                    _ => {}
                }
                self.record(prop.span.start, info);
            }
        }
    }

    fn property_info(&self, prop: &ObjectProperty<'_>) -> Option<CodeInfo> {
        let name = property_key_name(&prop.key)?;
        Some(match &prop.value {
            Expression::FunctionExpression(function) => {
                CodeInfo::Function(function_info(name, None, function, self.source))
            }
            value => CodeInfo::Value(ValueInfo {
                name,
                owner: None,
                value: Some(lower_expression(value, self.source)),
                in_config: false,
                is_static: false,
            }),
        })
    }

    fn assignment_info(&self, assign: &AssignmentExpression<'_>) -> Option<CodeInfo> {
        let (owner, name) = match &assign.left {
            AssignmentTarget::AssignmentTargetIdentifier(ident) => (None, ident.name.to_string()),
            AssignmentTarget::StaticMemberExpression(member) => {
                let owner = member_path(&member.object).filter(|path| path != "this");
                (owner, member.property.name.to_string())
            }
            _ => return None,
        };
        Some(match &assign.right {
            Expression::FunctionExpression(function) => {
                CodeInfo::Function(function_info(name, owner, function, self.source))
            }
            value => CodeInfo::Value(ValueInfo {
                name,
                owner,
                value: Some(lower_expression(value, self.source)),
                in_config: false,
                is_static: false,
            }),
        })
    }
}

impl<'a> Visit<'a> for CodeCollector<'_> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        self.ext_define(call);
        walk::walk_call_expression(self, call);
    }

    fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
        if let Some(info) = self.property_info(prop) {
            self.record(prop.span.start, info);
        }
        walk::walk_object_property(self, prop);
    }

    fn visit_assignment_expression(&mut self, assign: &AssignmentExpression<'a>) {
        if let Some(info) = self.assignment_info(assign) {
            self.record(assign.span.start, info);
        }
        walk::walk_assignment_expression(self, assign);
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration<'a>) {
        if let Some(declarator) = decl.declarations.first() {
            if let BindingPatternKind::BindingIdentifier(ident) = &declarator.id.kind {
                let name = ident.name.to_string();
                let info = match &declarator.init {
                    Some(Expression::FunctionExpression(function)) => {
                        CodeInfo::Function(function_info(name, None, function, self.source))
                    }
                    init => CodeInfo::Value(ValueInfo {
                        name,
                        owner: None,
                        value: init.as_ref().map(|expr| lower_expression(expr, self.source)),
                        in_config: false,
                        is_static: false,
                    }),
                };
                self.record(decl.span.start, info);
            }
        }
        walk::walk_variable_declaration(self, decl);
    }

    fn visit_function(&mut self, function: &Function<'a>, flags: ScopeFlags) {
        if let Some(id) = &function.id {
            let info = function_info(id.name.to_string(), None, function, self.source);
            self.record(function.span.start, CodeInfo::Function(info));
        }
        walk::walk_function(self, function, flags);
    }
}

fn function_info(name: String, owner: Option<String>, function: &Function<'_>, source: &str) -> FunctionInfo {
    let params = function
        .params
        .items
        .iter()
        .filter_map(|param| match &param.pattern.kind {
            BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.to_string()),
            _ => None,
        })
        .collect();
    let return_expressions = function
        .body
        .as_ref()
        .map(|body| collect_returns(body, source))
        .unwrap_or_default();
    FunctionInfo {
        name,
        owner,
        params,
        return_expressions,
        is_static: false,
    }
}

/// Collects the arguments of a body's `return` statements, skipping nested
/// functions. A bare `return;` counts as `undefined`.
fn collect_returns(body: &FunctionBody<'_>, source: &str) -> Vec<ExpressionNode> {
    let mut collector = ReturnCollector {
        source,
        returns: Vec::new(),
    };
    collector.visit_function_body(body);
    collector.returns
}

struct ReturnCollector<'s> {
    source: &'s str,
    returns: Vec<ExpressionNode>,
}

impl<'a> Visit<'a> for ReturnCollector<'_> {
    fn visit_return_statement(&mut self, stmt: &ReturnStatement<'a>) {
        let node = match &stmt.argument {
            Some(argument) => lower_expression(argument, self.source),
            None => ExpressionNode::ident("undefined"),
        };
        self.returns.push(node);
    }

    fn visit_function(&mut self, _function: &Function<'a>, _flags: ScopeFlags) {}

    fn visit_arrow_function_expression(&mut self, _arrow: &ArrowFunctionExpression<'a>) {}
}

fn string_value(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::StringLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

/// Class names from a string, an array of strings or an object of strings
/// (the keyed `mixins` form).
fn string_list(expr: &Expression<'_>, source: &str) -> Vec<String> {
    match evaluate_value(&lower_expression(expr, source)) {
        Ok(Value::Array(items)) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        Ok(Value::Object(entries)) => entries
            .values()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Ok(value) => value.as_str().map(|s| vec![s.to_string()]).unwrap_or_default(),
        Err(_) => Vec::new(),
    }
}

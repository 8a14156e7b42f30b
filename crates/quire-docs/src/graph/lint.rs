use rustc_hash::FxHashSet;

use super::{GraphContext, GraphPass};
use crate::diagnostics::{Category, Diagnostics};
use crate::error::Result;
use crate::model::{DeclarationRecord, TagName, Visibility};
use crate::relations::{ClassRecord, RelationsGraph};

/// Type names that never need a class of their own.
const BUILTIN_TYPES: &[&str] = &[
    "*",
    "Arguments",
    "Array",
    "Boolean",
    "CSSStyleRule",
    "CSSStyleSheet",
    "Date",
    "Element",
    "Error",
    "Event",
    "Function",
    "HTMLElement",
    "Mixed",
    "NodeList",
    "Number",
    "Object",
    "RegExp",
    "String",
    "TextNode",
    "Window",
    "XMLElement",
    "boolean",
    "null",
    "number",
    "string",
    "undefined",
];

/// Warns about documentation problems. Never modifies the graph.
pub struct LintPass;

impl GraphPass for LintPass {
    fn name(&self) -> &'static str {
        "lint"
    }

    fn process(&self, graph: &mut RelationsGraph, ctx: &mut GraphContext<'_>) -> Result<()> {
        let graph = &*graph;
        for class in graph.iter() {
            let mut lint = Lint {
                graph,
                class,
                diagnostics: &mut *ctx.diagnostics,
            };
            lint.class();
        }
        Ok(())
    }
}

struct Lint<'a, 'd> {
    graph: &'a RelationsGraph,
    class: &'a ClassRecord,
    diagnostics: &'d mut Diagnostics,
}

impl Lint<'_, '_> {
    fn class(&mut self) {
        let class = self.class;
        if class.meta.visibility != Visibility::Private && !class.meta.has_doc() {
            self.diagnostics.warn(
                Category::NoDoc,
                format!("No documentation for {}", class.name),
                class.location(),
            );
        }

        let mut seen = FxHashSet::default();
        for member in &class.members {
            if !seen.insert((member.tag, member.name.as_str())) {
                self.diagnostics.warn(
                    Category::DupMember,
                    format!("Duplicate {} name {}#{}", member.tag, class.name, member.name),
                    member.location(),
                );
            }
            self.member(member);
        }
    }

    fn member(&mut self, member: &DeclarationRecord) {
        let full_name = format!("{}#{}", self.class.name, member.name);
        let public = member.meta.visibility == Visibility::Public && !member.meta.autogenerated;

        if public && !member.has_doc() {
            self.diagnostics.warn(
                Category::NoDoc,
                format!("No documentation for {full_name}"),
                member.location(),
            );
        }

        if matches!(member.tag, TagName::Method | TagName::Event) {
            self.params(member, &full_name, public);
        }

        let types = member
            .meta
            .type_name
            .iter()
            .chain(member.meta.params.iter().filter_map(|p| p.type_name.as_ref()))
            .chain(member.meta.returns.iter().filter_map(|r| r.type_name.as_ref()));
        for type_expr in types {
            for name in type_names(type_expr) {
                if !self.is_known_type(name) {
                    self.diagnostics.warn(
                        Category::TypeName,
                        format!("Unknown type {name} in {full_name}"),
                        member.location(),
                    );
                }
            }
        }
    }

    fn params(&mut self, member: &DeclarationRecord, full_name: &str, public: bool) {
        let mut names = FxHashSet::default();
        let mut optional: Option<&str> = None;

        for param in &member.meta.params {
            if !names.insert(param.name.as_str()) {
                self.diagnostics.warn(
                    Category::DupParam,
                    format!("Duplicate parameter name {} in {full_name}", param.name),
                    member.location(),
                );
            }
            if public && param.doc.as_deref().is_none_or(|d| d.trim().is_empty()) {
                self.diagnostics.warn(
                    Category::NoDocParam,
                    format!("No documentation for parameter {} of {full_name}", param.name),
                    member.location(),
                );
            }
            match optional {
                Some(previous) if !param.optional => {
                    self.diagnostics.warn(
                        Category::ReqAfterOpt,
                        format!(
                            "Optional parameter {previous} followed by required parameter {} in {full_name}",
                            param.name
                        ),
                        member.location(),
                    );
                }
                None if param.optional => optional = Some(param.name.as_str()),
                _ => {}
            }
        }
    }

    fn is_known_type(&self, name: &str) -> bool {
        BUILTIN_TYPES.contains(&name) || self.graph.lookup(name).is_some()
    }
}

/// Class names referenced by a type expression such as
/// `String/Number[]|Ext.Element...`. Literal and structural parts are skipped.
fn type_names(expr: &str) -> impl Iterator<Item = &str> {
    expr.split(['/', '|', ','])
        .map(|part| {
            let mut part = part.trim();
            part = part.trim_start_matches("...").trim_end_matches("...");
            part = part.trim_start_matches(['?', '!']).trim_end_matches('=');
            while let Some(inner) = part.strip_suffix("[]") {
                part = inner;
            }
            part.trim()
        })
        .filter(|part| {
            !part.is_empty()
                && !part.starts_with(['{', '"', '\''])
                && !part.starts_with(|c: char| c.is_ascii_digit() || c == '-')
                && !part.contains(['<', '(', ':'])
        })
}

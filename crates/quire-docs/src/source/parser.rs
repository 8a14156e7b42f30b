use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::SourceType;
use rustc_hash::FxHashMap;

use super::SourceParser;
use super::code::{CodeCollector, CodeInfo};
use super::lower::parse_expression;
use crate::error::{DocsError, Result};
use crate::eval::{ExpressionNode, TypeClass, classify_type, evaluate_value};
use crate::jsdoc::{DocBlock, parse_doc_comment, split_name};
use crate::model::{
    ClassMeta, CodeStyle, DeclarationRecord, DocTag, EnumSpec, FileParseResult, InheritDoc,
    Metadata, Param, ReturnDoc, SourceLocation, TagName, Visibility,
};

/// Tags that name the kind of the documented entity.
const KIND_TAGS: &[(&str, TagName)] = &[
    ("class", TagName::Class),
    ("cfg", TagName::Cfg),
    ("property", TagName::Property),
    ("method", TagName::Method),
    ("event", TagName::Event),
];

/// Tags with a dedicated field; everything else lands in `extra_tags`.
const KNOWN_TAGS: &[&str] = &[
    "class",
    "cfg",
    "property",
    "method",
    "event",
    "param",
    "return",
    "returns",
    "type",
    "member",
    "private",
    "protected",
    "public",
    "static",
    "accessor",
    "evented",
    "enum",
    "inheritdoc",
    "inheritDoc",
    "chainable",
    "ignore",
    "deprecated",
    "since",
    "template",
    "extends",
    "extend",
    "mixins",
    "mixin",
    "requires",
    "singleton",
    "override",
];

/// [`SourceParser`] for JavaScript files annotated with jsduck-style doc comments.
///
/// Each `/** ... */` comment becomes one declaration record. Tags decide the
/// kind and name; the code right after the comment fills in whatever the
/// tags leave out.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocCommentParser;

impl DocCommentParser {
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for DocCommentParser {
    fn parse(&self, path: &Path, source: &str) -> Result<FileParseResult> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();

        if !ret.errors.is_empty() {
            let messages: Vec<String> = ret.errors.iter().map(|err| err.to_string()).collect();
            return Err(DocsError::parse_error(path.to_path_buf(), &messages));
        }

        let mut collector = CodeCollector::new(source);
        collector.visit_program(&ret.program);
        let code = collector.into_map();
        let line_index = LineIndex::new(source);

        let comments: Vec<_> = ret.program.comments.iter().filter(|c| c.is_jsdoc()).collect();

        // Of several comments in front of the same code only the last documents it.
        let mut closest: FxHashMap<u32, usize> = FxHashMap::default();
        for (idx, comment) in comments.iter().enumerate() {
            if comment.attached_to >= comment.span.end {
                closest.insert(comment.attached_to, idx);
            }
        }

        let mut result = FileParseResult::new(path);
        for (idx, comment) in comments.iter().enumerate() {
            let block = parse_doc_comment(comment.content_span().source_text(source));
            let code_info = match closest.get(&comment.attached_to) {
                Some(&owner) if owner == idx => code.get(&comment.attached_to),
                _ => None,
            };
            let location = SourceLocation::new(path, line_index.line(comment.span.start));
            match build_record(&block, code_info, location) {
                Some(record) => result.records.push(record),
                None => tracing::debug!(
                    path = %path.display(),
                    line = line_index.line(comment.span.start),
                    "doc comment documents nothing"
                ),
            }
        }

        tracing::debug!(path = %path.display(), records = result.records.len(), "parsed file");
        Ok(result)
    }
}

fn build_record(block: &DocBlock, code: Option<&CodeInfo>, location: SourceLocation) -> Option<DeclarationRecord> {
    let (tag, primary) = detect_kind(block, code)?;
    let mut record = if tag == TagName::Class {
        class_record(block, primary, code, location)?
    } else {
        member_record(tag, block, primary, code, location)?
    };
    apply_common(&mut record.meta, block);
    Some(record)
}

/// Explicit kind tag first, then class-only tags, then the code.
fn detect_kind<'b>(block: &'b DocBlock, code: Option<&CodeInfo>) -> Option<(TagName, Option<&'b DocTag>)> {
    for doc_tag in &block.tags {
        if let Some((_, kind)) = KIND_TAGS.iter().find(|(name, _)| *name == doc_tag.tag) {
            return Some((*kind, Some(doc_tag)));
        }
    }
    let class_only = ["enum", "extends", "extend", "mixins", "singleton"]
        .iter()
        .any(|tag| block.has(tag))
        || block.tag("override").is_some_and(|tag| !tag.body.is_empty());
    if class_only {
        return Some((TagName::Class, None));
    }
    match code? {
        CodeInfo::ExtDefine(_) => Some((TagName::Class, None)),
        CodeInfo::Function(_) => Some((TagName::Method, None)),
        CodeInfo::Value(value) if value.in_config => Some((TagName::Cfg, None)),
        CodeInfo::Value(_) => Some((TagName::Property, None)),
    }
}

fn class_record(
    block: &DocBlock,
    primary: Option<&DocTag>,
    code: Option<&CodeInfo>,
    location: SourceLocation,
) -> Option<DeclarationRecord> {
    let (spec, description) = primary.map(|tag| split_name(&tag.body)).unwrap_or((None, None));
    let name = spec
        .map(|spec| spec.name)
        .or_else(|| code.map(CodeInfo::full_name))?;
    // text after a bare `@enum {Type}` is documentation, not a value list
    let description = description.or_else(|| {
        block
            .tag("enum")
            .map(|tag| tag.body.trim())
            .filter(|body| !body.is_empty() && !body.starts_with('[') && !body.starts_with('{'))
            .map(str::to_string)
    });

    let define = match code {
        Some(CodeInfo::ExtDefine(define)) => Some(define),
        _ => None,
    };

    let mut class = ClassMeta {
        extends: first_word(block, &["extends", "extend"])
            .or_else(|| define.and_then(|d| d.extends.clone())),
        mixins: words(block, &["mixins", "mixin"]),
        requires: words(block, &["requires"]),
        override_target: block
            .tag("override")
            .and_then(|tag| tag.body.split_whitespace().next().map(str::to_string))
            .or_else(|| define.and_then(|d| d.override_target.clone())),
        singleton: block.has("singleton") || define.is_some_and(|d| d.singleton),
        enum_spec: None,
        code_style: if define.is_some() {
            CodeStyle::ExtDefine
        } else {
            CodeStyle::Plain
        },
    };
    if let Some(define) = define {
        if class.mixins.is_empty() {
            class.mixins = define.mixins.clone();
        }
        if class.requires.is_empty() {
            class.requires = define.requires.clone();
        }
    }
    if let Some(tag) = block.tag("enum") {
        class.enum_spec = Some(EnumSpec {
            type_name: tag.type_hint.clone(),
            values: enum_values(tag, code),
        });
    }

    let mut record = DeclarationRecord::new(TagName::Class, name, location);
    record.meta.doc = compose_doc(block, description);
    record.meta.class = class;
    Some(record)
}

fn member_record(
    tag: TagName,
    block: &DocBlock,
    primary: Option<&DocTag>,
    code: Option<&CodeInfo>,
    location: SourceLocation,
) -> Option<DeclarationRecord> {
    let (spec, description) = primary.map(|tag| split_name(&tag.body)).unwrap_or((None, None));
    let name = spec
        .as_ref()
        .map(|spec| spec.name.clone())
        .or_else(|| code.map(|info| info.name().to_string()))?;

    let mut record = DeclarationRecord::new(tag, name, location);
    record.owner = block
        .tag("member")
        .and_then(|tag| tag.body.split_whitespace().next().map(str::to_string))
        .or_else(|| {
            let path = match code {
                Some(CodeInfo::Function(function)) => function.owner.as_deref(),
                Some(CodeInfo::Value(value)) => value.owner.as_deref(),
                _ => None,
            };
            // `Foo.prototype.bar = ...` belongs to Foo; other dotted paths
            // are left to the current class
            path.and_then(|path| path.strip_suffix(".prototype"))
                .map(str::to_string)
        });

    let meta = &mut record.meta;
    meta.doc = compose_doc(block, description);
    meta.type_name = primary
        .and_then(|tag| tag.type_hint.clone())
        .or_else(|| block.tag("type").and_then(type_of_type_tag));

    match tag {
        TagName::Cfg | TagName::Property => {
            meta.default = spec.and_then(|spec| spec.default);
            match code {
                Some(CodeInfo::Value(value)) => {
                    meta.is_static |= value.is_static;
                    meta.accessor |= value.in_config && tag == TagName::Cfg;
                    if let Some(expr) = &value.value {
                        fill_from_value(meta, expr);
                        meta.value = Some(expr.clone());
                    }
                }
                Some(CodeInfo::Function(_)) if meta.type_name.is_none() => {
                    meta.type_name = Some("Function".to_string());
                }
                _ => {}
            }
        }
        TagName::Method => {
            meta.params = doc_params(block);
            meta.returns = doc_returns(block);
            if let Some(CodeInfo::Function(function)) = code {
                if meta.params.is_empty() {
                    meta.params = function.params.iter().map(Param::new).collect();
                }
                meta.return_expressions = function.return_expressions.clone();
                meta.is_static |= function.is_static;
            }
        }
        TagName::Event => meta.params = doc_params(block),
        TagName::Class => {}
    }
    Some(record)
}

/// Flags and annotations shared by classes and members.
fn apply_common(meta: &mut Metadata, block: &DocBlock) {
    if block.has("private") {
        meta.visibility = Visibility::Private;
    } else if block.has("protected") {
        meta.visibility = Visibility::Protected;
    }
    meta.is_static |= block.has("static");
    meta.accessor |= block.has("accessor");
    meta.evented |= block.has("evented");
    meta.chainable |= block.has("chainable");
    meta.template |= block.has("template");
    meta.ignore |= block.has("ignore");
    meta.deprecated = block.tag("deprecated").map(|tag| tag.body.clone());
    meta.since = block
        .tag("since")
        .map(|tag| tag.body.trim().to_string())
        .filter(|since| !since.is_empty());
    meta.inheritdoc = block
        .tag("inheritdoc")
        .or_else(|| block.tag("inheritDoc"))
        .map(|tag| InheritDoc {
            target: tag.body.split_whitespace().next().map(str::to_string),
        });
    meta.extra_tags = block
        .tags
        .iter()
        .filter(|tag| !KNOWN_TAGS.contains(&tag.tag.as_str()))
        .cloned()
        .collect();
}

/// Default value and type of a cfg or property from its code value.
fn fill_from_value(meta: &mut Metadata, expr: &ExpressionNode) {
    match evaluate_value(expr) {
        Ok(value) => {
            if meta.default.is_none() {
                meta.default = Some(value.to_literal());
            }
            if meta.type_name.is_none() {
                meta.type_name = value.type_name().map(str::to_string);
            }
        }
        Err(_) if meta.type_name.is_none() => {
            meta.type_name = match classify_type(expr) {
                TypeClass::Boolean => Some("Boolean".to_string()),
                TypeClass::String => Some("String".to_string()),
                TypeClass::Regexp => Some("RegExp".to_string()),
                _ if expr.node_type() == "FunctionExpression" => Some("Function".to_string()),
                _ => None,
            };
        }
        Err(_) => {}
    }
}

fn enum_values(tag: &DocTag, code: Option<&CodeInfo>) -> Option<ExpressionNode> {
    let body = tag.body.trim();
    if body.starts_with('[') || body.starts_with('{') {
        match parse_expression(body) {
            Ok(values) => return Some(values),
            Err(error) => tracing::debug!(%error, "unparsable enum value list"),
        }
    }
    match code {
        Some(CodeInfo::Value(value)) => value.value.clone(),
        _ => None,
    }
}

fn doc_params(block: &DocBlock) -> Vec<Param> {
    block
        .tags_named("param")
        .filter_map(|tag| {
            let (spec, doc) = split_name(&tag.body);
            let spec = spec?;
            Some(Param {
                name: spec.name,
                type_name: tag.type_hint.clone(),
                doc,
                optional: spec.optional,
                default: spec.default,
            })
        })
        .collect()
}

fn doc_returns(block: &DocBlock) -> Option<ReturnDoc> {
    let tag = block.tag("return").or_else(|| block.tag("returns"))?;
    Some(ReturnDoc {
        type_name: tag.type_hint.clone(),
        doc: Some(tag.body.clone()).filter(|doc| !doc.is_empty()),
    })
}

/// `@type {Foo}` and the bare `@type Foo` form.
fn type_of_type_tag(tag: &DocTag) -> Option<String> {
    tag.type_hint
        .clone()
        .or_else(|| tag.body.split_whitespace().next().map(str::to_string))
}

fn first_word(block: &DocBlock, tags: &[&str]) -> Option<String> {
    tags.iter()
        .filter_map(|name| block.tag(name))
        .find_map(|tag| tag.body.split_whitespace().next().map(str::to_string))
}

fn words(block: &DocBlock, tags: &[&str]) -> Vec<String> {
    tags.iter()
        .flat_map(|name| block.tags_named(name))
        .flat_map(|tag| tag.body.split_whitespace().map(str::to_string))
        .collect()
}

fn compose_doc(block: &DocBlock, description: Option<String>) -> Option<String> {
    let parts: Vec<&str> = block
        .summary
        .as_deref()
        .into_iter()
        .chain(description.as_deref())
        .collect();
    (!parts.is_empty()).then(|| parts.join("\n\n"))
}

#[derive(Debug)]
struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut line_starts = Vec::with_capacity(128);
        line_starts.push(0);
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((idx + 1) as u32);
            }
        }
        Self { line_starts }
    }

    fn line(&self, offset: u32) -> u32 {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        idx as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> FileParseResult {
        DocCommentParser::new()
            .parse(Path::new("test.js"), source)
            .expect("parse failed")
    }

    #[test]
    fn ext_define_class_with_config() {
        let result = parse(
            r#"
/**
 * A panel.
 */
Ext.define('My.Panel', {
    extend: 'Ext.Base',
    mixins: { observable: 'Ext.util.Observable' },
    config: {
        /**
         * The title.
         */
        title: 'Untitled'
    },
    /**
     * @param {Number} w Width.
     */
    setWidth: function(w) {
        return this;
    }
});
"#,
        );

        assert_eq!(result.records.len(), 3);
        let class = &result.records[0];
        assert_eq!(class.tag, TagName::Class);
        assert_eq!(class.name, "My.Panel");
        assert_eq!(class.files[0].line, 2);
        assert_eq!(class.meta.doc.as_deref(), Some("A panel."));
        assert_eq!(class.meta.class.extends.as_deref(), Some("Ext.Base"));
        assert_eq!(class.meta.class.mixins, ["Ext.util.Observable"]);
        assert_eq!(class.meta.class.code_style, CodeStyle::ExtDefine);

        let cfg = &result.records[1];
        assert_eq!(cfg.tag, TagName::Cfg);
        assert_eq!(cfg.name, "title");
        assert!(cfg.meta.accessor);
        assert_eq!(cfg.meta.type_name.as_deref(), Some("String"));
        assert_eq!(cfg.meta.default.as_deref(), Some("'Untitled'"));

        let method = &result.records[2];
        assert_eq!(method.tag, TagName::Method);
        assert_eq!(method.name, "setWidth");
        assert_eq!(method.meta.params[0].type_name.as_deref(), Some("Number"));
        assert_eq!(method.meta.return_expressions, [ExpressionNode::This]);
    }

    #[test]
    fn explicit_tags_win_over_code() {
        let result = parse(
            r#"
/**
 * @cfg {Boolean} [hidden=false]
 * True to hide.
 * @private
 */
/**
 * @property {Number} count
 */
Foo.prototype.count = 0;
"#,
        );
        let cfg = &result.records[0];
        assert_eq!(cfg.tag, TagName::Cfg);
        assert_eq!(cfg.meta.default.as_deref(), Some("false"));
        assert_eq!(cfg.meta.doc.as_deref(), Some("True to hide."));
        assert_eq!(cfg.meta.visibility, Visibility::Private);
        assert!(cfg.meta.value.is_none());

        let property = &result.records[1];
        assert_eq!(property.tag, TagName::Property);
        assert_eq!(property.owner.as_deref(), Some("Foo"));
        assert_eq!(property.meta.default.as_deref(), Some("0"));
    }

    #[test]
    fn nested_function_returns_are_skipped() {
        let result = parse(
            r#"
/** Checks. */
function check(a) {
    var f = function() { return 'nested'; };
    if (a) { return; }
    return a > 1;
}
"#,
        );
        let method = &result.records[0];
        assert_eq!(method.meta.params, [Param::new("a")]);
        assert_eq!(method.meta.return_expressions.len(), 2);
        assert_eq!(method.meta.return_expressions[0], ExpressionNode::ident("undefined"));
    }

    #[test]
    fn enum_from_assignment() {
        let result = parse(
            r#"
/**
 * @enum {String}
 * Sizes.
 */
My.Size = { SMALL: 's', LARGE: 'l' };
"#,
        );
        let class = &result.records[0];
        assert_eq!(class.name, "My.Size");
        assert_eq!(class.meta.doc.as_deref(), Some("Sizes."));
        let spec = class.meta.class.enum_spec.as_ref().unwrap();
        assert_eq!(spec.type_name.as_deref(), Some("String"));
        assert!(matches!(spec.values, Some(ExpressionNode::Object { .. })));
    }

    #[test]
    fn enum_values_from_tag_body() {
        let result = parse("/**\n * @class Dir\n * @enum {String} ['up', 'down']\n */\n");
        let spec = result.records[0].meta.class.enum_spec.as_ref().unwrap();
        assert!(matches!(&spec.values, Some(ExpressionNode::Array { elements }) if elements.len() == 2));
    }

    #[test]
    fn unknown_tags_are_kept() {
        let result = parse("/**\n * @method go\n * @example\n *     go();\n */\n");
        let extra = &result.records[0].meta.extra_tags;
        assert_eq!(extra.len(), 1);
        assert_eq!(extra[0].tag, "example");
        assert_eq!(extra[0].body, "go();");
    }

    #[test]
    fn syntax_errors_fail_the_file() {
        let err = DocCommentParser::new()
            .parse(Path::new("broken.js"), "var = ;")
            .unwrap_err();
        assert!(matches!(err, DocsError::Parse { .. }));
    }
}

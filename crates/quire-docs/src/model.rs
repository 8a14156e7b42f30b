use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::eval::ExpressionNode;

/// Name of the synthetic class that collects declarations without an owner.
pub const GLOBAL_CLASS: &str = "global";

/// Parse output of a single source file, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileParseResult {
    /// File-system path (or virtual path) of the source.
    pub path: PathBuf,
    /// Documented entities found in the file.
    pub records: Vec<DeclarationRecord>,
}

impl FileParseResult {
    /// Creates an empty result for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Returns `true` when the file contributed no declarations.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Kind of a documented entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagName {
    Class,
    Cfg,
    Property,
    Method,
    Event,
}

impl TagName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Cfg => "cfg",
            Self::Property => "property",
            Self::Method => "method",
            Self::Event => "event",
        }
    }

    /// Every tag except `Class` denotes a class member.
    pub fn is_member(&self) -> bool {
        !matches!(self, Self::Class)
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a declaration was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// One-based line of the doc comment.
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl AsRef<Path>, line: u32) -> Self {
        Self {
            file: file.as_ref().to_path_buf(),
            line,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// One documented entity as extracted from one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationRecord {
    pub tag: TagName,
    pub name: String,
    /// Owning class. Unresolved (`None`) until aggregation for most members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Provenance. Reopened classes accumulate one entry per contributing file.
    pub files: Vec<SourceLocation>,
    #[serde(default)]
    pub meta: Metadata,
    /// Set by the ignore pass; ignored records are dropped by the class filter.
    #[serde(default)]
    pub ignored: bool,
}

impl DeclarationRecord {
    pub fn new(tag: TagName, name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            tag,
            name: name.into(),
            owner: None,
            files: vec![location],
            meta: Metadata::default(),
            ignored: false,
        }
    }

    /// Class record without any provenance, used for classes that are only
    /// ever referenced (orphan owners, override targets, `global`).
    pub fn empty_class(name: impl Into<String>) -> Self {
        Self {
            tag: TagName::Class,
            name: name.into(),
            owner: None,
            files: Vec::new(),
            meta: Metadata::default(),
            ignored: false,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// First file the record was seen in.
    pub fn location(&self) -> Option<&SourceLocation> {
        self.files.first()
    }

    pub fn has_doc(&self) -> bool {
        self.meta.has_doc()
    }
}

/// Documentation fields attached to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Declared or inferred type expression, e.g. `String/Number[]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Default value in source form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Value expression found in code, kept for later evaluation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ExpressionNode>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    /// Cfg that gets generated getter/setter methods.
    #[serde(default)]
    pub accessor: bool,
    /// Cfg whose setter fires a `<name>change` event.
    #[serde(default)]
    pub evented: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnDoc>,
    /// Argument expressions of the method body's `return` statements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub return_expressions: Vec<ExpressionNode>,
    #[serde(default)]
    pub chainable: bool,
    #[serde(default)]
    pub template: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inheritdoc: Option<InheritDoc>,
    /// Explicit ignore marker from the source.
    #[serde(default)]
    pub ignore: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    /// Not present in any imported earlier version.
    #[serde(default)]
    pub is_new: bool,
    /// Created by a pass rather than written in the source.
    #[serde(default)]
    pub autogenerated: bool,
    /// Class the documentation was copied from by the inherit-doc pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
    /// Tags without a dedicated field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_tags: Vec<DocTag>,
    #[serde(default)]
    pub class: ClassMeta,
}

impl Metadata {
    pub fn has_doc(&self) -> bool {
        self.doc.as_deref().is_some_and(|doc| !doc.trim().is_empty())
    }

    /// Appends a paragraph to the doc text.
    pub fn append_doc(&mut self, paragraph: &str) {
        match &mut self.doc {
            Some(doc) if !doc.trim().is_empty() => {
                doc.push_str("\n\n");
                doc.push_str(paragraph);
            }
            _ => self.doc = Some(paragraph.to_string()),
        }
    }
}

/// Class-level fields. References are by name and resolved by the relations graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    /// Name of the class this one overrides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_target: Option<String>,
    #[serde(default)]
    pub singleton: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_spec: Option<EnumSpec>,
    #[serde(default)]
    pub code_style: CodeStyle,
}

/// How a class was declared in code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStyle {
    #[default]
    Plain,
    /// `Ext.define('Name', {...})`
    ExtDefine,
}

/// Enumeration declared through `@enum`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Value set to expand into members (array or object literal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<ExpressionNode>,
}

/// `@inheritdoc`, optionally naming the source as `Class#member`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Structured representation of a doc tag without a dedicated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTag {
    /// Tag identifier (e.g. `example`, `see`).
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
    /// Everything after the tag and type, continuation lines included.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub body: String,
}

impl DocTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            type_hint: None,
            body: String::new(),
        }
    }
}

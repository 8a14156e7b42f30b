//! Leveled diagnostics reported by the pipeline.
//!
//! Every accepted diagnostic is kept in order and forwarded to `tracing`.
//! Warning and info categories can be muted through configuration; fatal
//! diagnostics are always kept.

use std::fmt;
use std::path::PathBuf;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::model::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Warning,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Member of the synthetic global class.
    Global,
    /// Conflicting or unresolvable class relations.
    Extend,
    Enum,
    Override,
    #[serde(rename = "inheritdoc")]
    InheritDoc,
    Import,
    /// Inheritance cycle.
    Cycle,
    NoDoc,
    NoDocParam,
    DupMember,
    DupParam,
    ReqAfterOpt,
    TypeName,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Extend => "extend",
            Self::Enum => "enum",
            Self::Override => "override",
            Self::InheritDoc => "inheritdoc",
            Self::Import => "import",
            Self::Cycle => "cycle",
            Self::NoDoc => "no_doc",
            Self::NoDocParam => "no_doc_param",
            Self::DupMember => "dup_member",
            Self::DupParam => "dup_param",
            Self::ReqAfterOpt => "req_after_opt",
            Self::TypeName => "type_name",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: Level,
    pub category: Category,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Diagnostic {
    pub fn new(level: Level, category: Category, message: impl Into<String>) -> Self {
        Self {
            level,
            category,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    pub fn at(mut self, location: Option<&SourceLocation>) -> Self {
        if let Some(location) = location {
            self.file = Some(location.file.clone());
            self.line = Some(location.line);
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => {
                write!(f, "{}:{}: [{}] {}", file.display(), line, self.category, self.message)
            }
            (Some(file), None) => write!(f, "{}: [{}] {}", file.display(), self.category, self.message),
            _ => write!(f, "[{}] {}", self.category, self.message),
        }
    }
}

/// Ordered collection of the diagnostics reported during a run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    disabled: FxHashSet<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutes the given warning/info categories (by their `as_str` name).
    pub fn with_disabled<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: Vec::new(),
            disabled: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_enabled(&self, level: Level, category: Category) -> bool {
        level == Level::Fatal || !self.disabled.contains(category.as_str())
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        if !self.is_enabled(diagnostic.level, diagnostic.category) {
            return;
        }
        match diagnostic.level {
            Level::Info => tracing::info!(category = %diagnostic.category, "{diagnostic}"),
            Level::Warning => tracing::warn!(category = %diagnostic.category, "{diagnostic}"),
            Level::Fatal => tracing::error!(category = %diagnostic.category, "{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    pub fn info(&mut self, category: Category, message: impl Into<String>, location: Option<&SourceLocation>) {
        self.report(Diagnostic::new(Level::Info, category, message).at(location));
    }

    pub fn warn(&mut self, category: Category, message: impl Into<String>, location: Option<&SourceLocation>) {
        self.report(Diagnostic::new(Level::Warning, category, message).at(location));
    }

    pub fn fatal(&mut self, category: Category, message: impl Into<String>, location: Option<&SourceLocation>) {
        self.report(Diagnostic::new(Level::Fatal, category, message).at(location));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn of_category(&self, category: Category) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.category == category)
    }

    pub fn has_fatal(&self) -> bool {
        self.entries.iter().any(|d| d.level == Level::Fatal)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_with_location() {
        let mut diagnostics = Diagnostics::new();
        let location = SourceLocation::new("src/a.js", 12);
        diagnostics.warn(Category::Global, "Global method: foo", Some(&location));
        diagnostics.info(Category::Import, "imported 4.0", None);

        let all: Vec<_> = diagnostics.iter().collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].line, Some(12));
        assert_eq!(all[0].to_string(), "src/a.js:12: [global] Global method: foo");
        assert_eq!(all[1].to_string(), "[import] imported 4.0");
    }

    #[test]
    fn disabled_categories_are_dropped_but_fatals_are_kept() {
        let mut diagnostics = Diagnostics::with_disabled(["global", "cycle"]);
        diagnostics.warn(Category::Global, "Global property: x", None);
        diagnostics.fatal(Category::Cycle, "A -> B -> A", None);
        diagnostics.warn(Category::NoDoc, "No documentation for Foo", None);

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has_fatal());
        assert_eq!(diagnostics.of_category(Category::Global).count(), 0);
    }

    #[test]
    fn category_names_match_their_serialized_form() {
        let categories = [
            Category::Global,
            Category::Extend,
            Category::Enum,
            Category::Override,
            Category::InheritDoc,
            Category::Import,
            Category::Cycle,
            Category::NoDoc,
            Category::NoDocParam,
            Category::DupMember,
            Category::DupParam,
            Category::ReqAfterOpt,
            Category::TypeName,
        ];
        for category in categories {
            let serialized = serde_json::to_value(category).unwrap();
            assert_eq!(serialized, category.as_str(), "{category:?}");
        }
        // parse failures abort the run as errors and have no warning category
        assert!(serde_json::from_str::<Category>("\"parse\"").is_err());
    }
}

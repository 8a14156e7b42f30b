//! Final class records and the graph of their relations.

use indexmap::{IndexMap, IndexSet};
use quire_config::matches_external;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::model::{DeclarationRecord, Metadata, SourceLocation, TagName};

/// A documented class after filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRecord {
    pub name: String,
    pub files: Vec<SourceLocation>,
    pub meta: Metadata,
    pub members: Vec<DeclarationRecord>,
}

impl ClassRecord {
    pub fn parent(&self) -> Option<&str> {
        self.meta.class.extends.as_deref()
    }

    pub fn mixins(&self) -> &[String] {
        &self.meta.class.mixins
    }

    pub fn find_member(&self, tag: TagName, name: &str) -> Option<&DeclarationRecord> {
        self.members.iter().find(|m| m.tag == tag && m.name == name)
    }

    pub fn members_of(&self, tag: TagName) -> impl Iterator<Item = &DeclarationRecord> {
        self.members.iter().filter(move |m| m.tag == tag)
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.files.first()
    }
}

/// Result of resolving a class name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassRef<'a> {
    Local(&'a ClassRecord),
    /// Referenced but documented elsewhere.
    External(&'a str),
}

impl<'a> ClassRef<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Local(class) => &class.name,
            Self::External(name) => name,
        }
    }

    pub fn as_local(&self) -> Option<&'a ClassRecord> {
        match *self {
            Self::Local(class) => Some(class),
            Self::External(_) => None,
        }
    }
}

/// All classes by name plus stubs for external classes.
///
/// Every parent or mixin name of a class resolves either to a class record
/// or to an external stub.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelationsGraph {
    classes: IndexMap<String, ClassRecord>,
    externals: IndexSet<String>,
    /// Configured `Prefix*` patterns.
    #[serde(skip)]
    external_patterns: Vec<String>,
}

impl RelationsGraph {
    /// Builds the graph; `externals` may hold exact names and `Prefix*`
    /// patterns. Unknown parent and mixin names become stubs.
    pub fn new(classes: Vec<ClassRecord>, externals: impl IntoIterator<Item = String>) -> Self {
        let mut graph = Self::default();
        for name in externals {
            if name.ends_with('*') {
                graph.external_patterns.push(name);
            } else {
                graph.externals.insert(name);
            }
        }
        for class in classes {
            graph.classes.insert(class.name.clone(), class);
        }

        let referenced: Vec<String> = graph
            .classes
            .values()
            .flat_map(|class| class.parent().into_iter().chain(class.mixins().iter().map(String::as_str)))
            .filter(|name| !graph.classes.contains_key(*name))
            .map(str::to_string)
            .collect();
        for name in referenced {
            graph.externals.insert(name);
        }
        // a class that is both documented and listed as external is documented
        let classes = &graph.classes;
        graph.externals.retain(|name| !classes.contains_key(name));
        graph
    }

    pub fn get(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClassRecord> {
        self.classes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Resolves `name` to a class or an external stub.
    pub fn lookup<'a>(&'a self, name: &'a str) -> Option<ClassRef<'a>> {
        if let Some(class) = self.classes.get(name) {
            return Some(ClassRef::Local(class));
        }
        if let Some(stub) = self.externals.get(name) {
            return Some(ClassRef::External(stub.as_str()));
        }
        self.external_patterns
            .iter()
            .any(|pattern| matches_external(pattern, name))
            .then_some(ClassRef::External(name))
    }

    pub fn is_external(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(ClassRef::External(_)))
    }

    pub fn parent_of(&self, name: &str) -> Option<ClassRef<'_>> {
        let parent = self.classes.get(name)?.parent()?;
        self.lookup(parent)
    }

    pub fn mixins_of(&self, name: &str) -> Vec<ClassRef<'_>> {
        self.classes
            .get(name)
            .map(|class| class.mixins().iter().filter_map(|m| self.lookup(m)).collect())
            .unwrap_or_default()
    }

    /// Documented ancestors along `extends`, nearest first. Stops at the
    /// first external class or repeated name.
    pub fn ancestors(&self, name: &str) -> Vec<&ClassRecord> {
        let mut seen = FxHashSet::default();
        seen.insert(name);
        let mut result = Vec::new();
        let mut current = self.classes.get(name);
        while let Some(class) = current {
            let Some(parent) = class.parent() else {
                break;
            };
            if !seen.insert(parent) {
                break;
            }
            current = self.classes.get(parent);
            if let Some(parent) = current {
                result.push(parent);
            }
        }
        result
    }

    /// Classes that directly extend `name`. Computed by scanning.
    pub fn subclasses(&self, name: &str) -> Vec<&ClassRecord> {
        self.classes
            .values()
            .filter(|class| class.parent() == Some(name))
            .collect()
    }

    /// Classes that list `name` among their mixins.
    pub fn mixed_into(&self, name: &str) -> Vec<&ClassRecord> {
        self.classes
            .values()
            .filter(|class| class.mixins().iter().any(|m| m == name))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassRecord> {
        self.classes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClassRecord> {
        self.classes.values_mut()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn external_names(&self) -> impl Iterator<Item = &str> {
        self.externals.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

//! Merging of per-file parse results into one class registry.

use indexmap::IndexMap;

use crate::diagnostics::{Category, Diagnostics};
use crate::model::{CodeStyle, DeclarationRecord, FileParseResult, GLOBAL_CLASS, TagName};

/// Doc text given to the synthetic class that collects orphan members.
const GLOBAL_CLASS_DOC: &str = "Global variables and functions.";

/// A class and the members collected for it so far.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub record: DeclarationRecord,
    pub members: Vec<DeclarationRecord>,
}

impl ClassEntry {
    pub fn new(record: DeclarationRecord) -> Self {
        Self {
            record,
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn find_member(&self, tag: TagName, name: &str) -> Option<&DeclarationRecord> {
        self.members.iter().find(|m| m.tag == tag && m.name == name)
    }

    pub fn has_member(&self, tag: TagName, name: &str) -> bool {
        self.find_member(tag, name).is_some()
    }

    /// Adds a member, taking ownership of it.
    pub fn push_member(&mut self, mut member: DeclarationRecord) {
        member.owner = Some(self.record.name.clone());
        self.members.push(member);
    }
}

/// Classes by name, in the order they were first seen.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, ClassEntry>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClassEntry> {
        self.classes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Returns the entry for `name`, creating an empty class when missing.
    pub fn ensure(&mut self, name: &str) -> &mut ClassEntry {
        self.classes
            .entry(name.to_string())
            .or_insert_with(|| ClassEntry::new(DeclarationRecord::empty_class(name)))
    }

    pub fn insert(&mut self, entry: ClassEntry) {
        self.classes.insert(entry.record.name.clone(), entry);
    }

    /// Removes a class while keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<ClassEntry> {
        self.classes.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClassEntry> {
        self.classes.values_mut()
    }

    pub fn names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn into_entries(self) -> impl Iterator<Item = ClassEntry> {
        self.classes.into_values()
    }
}

/// Builds a [`ClassRegistry`] from file results fed in caller order.
#[derive(Debug, Default)]
pub struct Aggregator {
    registry: ClassRegistry,
    orphans: Vec<DeclarationRecord>,
    current_class: Option<String>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aggregate(&mut self, file: &FileParseResult, diagnostics: &mut Diagnostics) {
        tracing::debug!(path = %file.path.display(), "aggregating");
        self.current_class = None;
        for record in &file.records {
            if record.tag == TagName::Class {
                self.add_class(record.clone(), diagnostics);
            } else {
                self.add_member(record.clone());
            }
        }
    }

    /// Places every orphan with an explicit owner into that class, creating
    /// the class when it was never declared.
    pub fn classify_orphans(&mut self) {
        let orphans = std::mem::take(&mut self.orphans);
        for orphan in orphans {
            match orphan.owner.clone() {
                Some(owner) => self.registry.ensure(&owner).push_member(orphan),
                None => self.orphans.push(orphan),
            }
        }
    }

    /// Puts the remaining orphans into the `global` class. No class is
    /// created when there is nothing left.
    pub fn create_global_class(&mut self) {
        if self.orphans.is_empty() {
            return;
        }
        let global = self.registry.ensure(GLOBAL_CLASS);
        if !global.record.meta.has_doc() {
            global.record.meta.doc = Some(GLOBAL_CLASS_DOC.to_string());
        }
        for orphan in self.orphans.drain(..) {
            global.push_member(orphan);
        }
    }

    pub fn orphans(&self) -> &[DeclarationRecord] {
        &self.orphans
    }

    pub fn finish(self) -> ClassRegistry {
        self.registry
    }

    fn add_class(&mut self, record: DeclarationRecord, diagnostics: &mut Diagnostics) {
        let name = record.name.clone();
        match self.registry.get_mut(&name) {
            Some(existing) => merge_class(&mut existing.record, record, diagnostics),
            None => self.registry.insert(ClassEntry::new(record)),
        }
        self.insert_orphans(&name);
        self.current_class = Some(name);
    }

    fn add_member(&mut self, member: DeclarationRecord) {
        let target = match &member.owner {
            Some(owner) => self.registry.contains(owner).then(|| owner.clone()),
            None => self.current_class.clone(),
        };
        match target.and_then(|name| self.registry.get_mut(&name)) {
            Some(entry) => entry.push_member(member),
            None => self.orphans.push(member),
        }
    }

    /// Moves orphans that name `class` as owner into it.
    fn insert_orphans(&mut self, class: &str) {
        if !self.orphans.iter().any(|o| o.owner.as_deref() == Some(class)) {
            return;
        }
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.orphans)
            .into_iter()
            .partition(|o| o.owner.as_deref() == Some(class));
        self.orphans = rest;
        if let Some(entry) = self.registry.get_mut(class) {
            for orphan in matching {
                entry.push_member(orphan);
            }
        }
    }
}

/// Folds a reopened class declaration into the existing record. Present
/// fields win; lists are concatenated.
fn merge_class(old: &mut DeclarationRecord, new: DeclarationRecord, diagnostics: &mut Diagnostics) {
    let location = new.location().cloned();
    let new_has_doc = new.meta.has_doc();
    let old_class = &mut old.meta.class;
    let new_class = new.meta.class;

    if let Some(other) = new_class.extends {
        match &old_class.extends {
            Some(current) if *current != other => diagnostics.warn(
                Category::Extend,
                format!(
                    "Class {} extends {} here but {} elsewhere",
                    old.name, other, current
                ),
                location.as_ref(),
            ),
            Some(_) => {}
            None => old_class.extends = Some(other),
        }
    }
    for mixin in new_class.mixins {
        if !old_class.mixins.contains(&mixin) {
            old_class.mixins.push(mixin);
        }
    }
    for required in new_class.requires {
        if !old_class.requires.contains(&required) {
            old_class.requires.push(required);
        }
    }
    old_class.singleton |= new_class.singleton;
    if old_class.override_target.is_none() {
        old_class.override_target = new_class.override_target;
    }
    if old_class.enum_spec.is_none() {
        old_class.enum_spec = new_class.enum_spec;
    }
    if new_class.code_style == CodeStyle::ExtDefine {
        old_class.code_style = new_class.code_style;
    }

    if !old.meta.has_doc() && new_has_doc {
        old.meta.doc = new.meta.doc;
    }
    old.meta.ignore |= new.meta.ignore;
    old.files.extend(new.files);
}

/// Runs aggregation over all files, then orphan classification and the
/// `global` class step.
pub fn aggregate(files: &[FileParseResult], diagnostics: &mut Diagnostics) -> ClassRegistry {
    let mut aggregator = Aggregator::new();
    for file in files {
        aggregator.aggregate(file, diagnostics);
    }
    aggregator.classify_orphans();
    aggregator.create_global_class();
    aggregator.finish()
}

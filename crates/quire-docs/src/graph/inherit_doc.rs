use rustc_hash::FxHashSet;

use super::{GraphContext, GraphPass};
use crate::diagnostics::Category;
use crate::error::Result;
use crate::model::{DeclarationRecord, Param, ReturnDoc, TagName};
use crate::relations::{ClassRecord, RelationsGraph};

/// Copies documentation into undocumented members and members marked with
/// `@inheritdoc` from the member they override.
///
/// The search visits the parent's whole hierarchy first (each ancestor,
/// then its mixins) and the class's own mixins after that. Only fields
/// that are still empty are filled, so running the pass twice changes
/// nothing.
pub struct InheritDocPass;

/// Documentation found for one member.
struct Inherited {
    class: String,
    index: usize,
    from: String,
    doc: Option<String>,
    type_name: Option<String>,
    params: Vec<Param>,
    returns: Option<ReturnDoc>,
}

impl GraphPass for InheritDocPass {
    fn name(&self) -> &'static str {
        "inherit_doc"
    }

    fn process(&self, graph: &mut RelationsGraph, ctx: &mut GraphContext<'_>) -> Result<()> {
        let mut updates = Vec::new();

        for class in graph.iter() {
            for (index, member) in class.members.iter().enumerate() {
                let explicit = member.meta.inheritdoc.as_ref();
                if explicit.is_none() && (member.has_doc() || member.meta.autogenerated) {
                    continue;
                }
                let source = match explicit.and_then(|i| i.target.as_deref()) {
                    Some(target) => resolve_target(graph, class, member, target),
                    None => find_documented(graph, class, member.tag, &member.name),
                };
                match source {
                    Some((from, source)) => updates.push(Inherited {
                        class: class.name.clone(),
                        index,
                        from: from.to_string(),
                        doc: source.meta.doc.clone(),
                        type_name: source.meta.type_name.clone(),
                        params: source.meta.params.clone(),
                        returns: source.meta.returns.clone(),
                    }),
                    None if explicit.is_some() => {
                        let target = explicit
                            .and_then(|i| i.target.clone())
                            .unwrap_or_else(|| format!("{}#{}", class.name, member.name));
                        ctx.diagnostics.warn(
                            Category::InheritDoc,
                            format!("@inheritdoc {target} - parent member not found"),
                            member.location(),
                        );
                    }
                    None => {}
                }
            }
        }

        tracing::debug!(count = updates.len(), "inheriting member docs");
        for update in updates {
            if let Some(member) = graph
                .get_mut(&update.class)
                .and_then(|class| class.members.get_mut(update.index))
            {
                apply(member, update);
            }
        }
        Ok(())
    }
}

fn apply(member: &mut DeclarationRecord, inherited: Inherited) {
    let meta = &mut member.meta;
    if !meta.has_doc() && inherited.doc.as_deref().is_some_and(|d| !d.trim().is_empty()) {
        meta.doc = inherited.doc;
        meta.inherited_from = Some(inherited.from);
    }
    if meta.type_name.is_none() {
        meta.type_name = inherited.type_name;
    }

    if meta.params.is_empty() {
        meta.params = inherited.params;
    } else {
        for param in &mut meta.params {
            let Some(source) = inherited.params.iter().find(|p| p.name == param.name) else {
                continue;
            };
            if param.doc.is_none() {
                param.doc = source.doc.clone();
            }
            if param.type_name.is_none() {
                param.type_name = source.type_name.clone();
            }
        }
    }

    match (&mut meta.returns, inherited.returns) {
        (None, returns) => meta.returns = returns,
        (Some(own), Some(source)) => {
            if own.doc.is_none() {
                own.doc = source.doc;
            }
            if own.type_name.is_none() {
                own.type_name = source.type_name;
            }
        }
        (Some(_), None) => {}
    }
}

/// Resolves an explicit `Class#member`, `Class#tag-member`, `#member` or
/// `Class` reference.
fn resolve_target<'g>(
    graph: &'g RelationsGraph,
    class: &ClassRecord,
    member: &DeclarationRecord,
    target: &str,
) -> Option<(&'g str, &'g DeclarationRecord)> {
    let (class_name, member_ref) = target.split_once('#').unwrap_or((target, ""));
    let class_name = if class_name.is_empty() { class.name.as_str() } else { class_name };

    let (tag, name) = match member_ref.split_once('-') {
        Some((tag, name)) => (parse_tag(tag), name),
        None if member_ref.is_empty() => (None, member.name.as_str()),
        None => (None, member_ref),
    };
    let tag = tag.or(Some(member.tag));

    let mut visited = FxHashSet::default();
    let (owner, found) = find_in_hierarchy(graph, class_name, tag, name, &mut visited)
        .or_else(|| find_in_hierarchy(graph, class_name, None, name, &mut FxHashSet::default()))?;

    // a target that is itself undocumented keeps searching above it
    if found.has_doc() {
        return Some((owner.name.as_str(), found));
    }
    find_documented(graph, owner, found.tag, &found.name)
}

fn parse_tag(tag: &str) -> Option<TagName> {
    match tag {
        "cfg" => Some(TagName::Cfg),
        "property" => Some(TagName::Property),
        "method" => Some(TagName::Method),
        "event" => Some(TagName::Event),
        _ => None,
    }
}

/// Nearest documented member with the same name and kind above `class`.
fn find_documented<'g>(
    graph: &'g RelationsGraph,
    class: &ClassRecord,
    tag: TagName,
    name: &str,
) -> Option<(&'g str, &'g DeclarationRecord)> {
    let mut searched: FxHashSet<String> = FxHashSet::default();
    let mut current = class.name.clone();

    loop {
        if !searched.insert(current.clone()) {
            return None;
        }
        let start = graph.get(&current)?;
        let mut visited = FxHashSet::default();
        visited.insert(current.clone());

        let (owner, found) = start
            .parent()
            .into_iter()
            .chain(start.mixins().iter().map(String::as_str))
            .find_map(|next| find_in_hierarchy(graph, next, Some(tag), name, &mut visited))?;

        if found.has_doc() {
            return Some((owner.name.as_str(), found));
        }
        current = owner.name.clone();
    }
}

/// Looks for a member in `class_name` itself, then its parent chain, then
/// its mixins.
fn find_in_hierarchy<'g>(
    graph: &'g RelationsGraph,
    class_name: &str,
    tag: Option<TagName>,
    name: &str,
    visited: &mut FxHashSet<String>,
) -> Option<(&'g ClassRecord, &'g DeclarationRecord)> {
    if !visited.insert(class_name.to_string()) {
        return None;
    }
    let class = graph.get(class_name)?;
    let own = class
        .members
        .iter()
        .find(|m| m.name == name && tag.is_none_or(|tag| m.tag == tag));
    if let Some(member) = own {
        return Some((class, member));
    }
    class
        .parent()
        .into_iter()
        .chain(class.mixins().iter().map(String::as_str))
        .find_map(|next| find_in_hierarchy(graph, next, tag, name, visited))
}

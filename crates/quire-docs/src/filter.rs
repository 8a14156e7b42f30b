use indexmap::IndexSet;

use crate::aggregator::ClassRegistry;
use crate::diagnostics::{Category, Diagnostics};
use crate::model::GLOBAL_CLASS;
use crate::relations::{ClassRecord, RelationsGraph};

/// Turns registry entries into class records and builds the relations graph.
///
/// Ignored classes and members are dropped. Every member of the `global`
/// class is reported once, whether or not the class itself is kept.
pub fn filter_classes(
    registry: ClassRegistry,
    externals: &IndexSet<String>,
    drop_global_class: bool,
    diagnostics: &mut Diagnostics,
) -> RelationsGraph {
    let mut classes = Vec::with_capacity(registry.len());

    for entry in registry.into_entries() {
        if entry.record.ignored {
            continue;
        }
        let members: Vec<_> = entry.members.into_iter().filter(|m| !m.ignored).collect();
        let is_global = entry.record.name == GLOBAL_CLASS;
        if is_global {
            for member in &members {
                diagnostics.warn(
                    Category::Global,
                    format!("Global {}: {}", member.tag, member.name),
                    member.location(),
                );
            }
            if drop_global_class {
                continue;
            }
        }
        classes.push(ClassRecord {
            name: entry.record.name,
            files: entry.record.files,
            meta: entry.record.meta,
            members,
        });
    }

    tracing::debug!(classes = classes.len(), externals = externals.len(), "building relations");
    RelationsGraph::new(classes, externals.iter().cloned())
}

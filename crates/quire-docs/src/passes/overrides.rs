use rustc_hash::FxHashSet;

use super::{LocalPass, PassContext};
use crate::aggregator::{ClassEntry, ClassRegistry};
use crate::diagnostics::Category;

/// Folds override classes into the classes they override.
///
/// The override class disappears from the registry and its name becomes an
/// external class, so references to it still resolve.
pub struct OverridePass;

impl LocalPass for OverridePass {
    fn name(&self) -> &'static str {
        "override"
    }

    fn process(&self, registry: &mut ClassRegistry, ctx: &mut PassContext<'_>) {
        // targets are resolved up front so removing one override does not
        // cut the chain of another
        let overrides: Vec<(String, Option<String>)> = registry
            .iter()
            .filter(|entry| entry.record.meta.class.override_target.is_some())
            .map(|entry| (entry.name().to_string(), resolve_target(registry, entry.name())))
            .collect();

        for (name, target) in overrides {
            let Some(target) = target else {
                // a chain that loops back never reaches a real class; the
                // override is dropped along with its members
                if let Some(entry) = registry.remove(&name) {
                    ctx.diagnostics.warn(
                        Category::Override,
                        format!("Override {name} overrides itself"),
                        entry.record.location(),
                    );
                }
                ctx.externals.insert(name);
                continue;
            };
            let Some(entry) = registry.remove(&name) else {
                continue;
            };
            if !registry.contains(&target) {
                ctx.diagnostics.warn(
                    Category::Override,
                    format!("Class {target} overridden by {name} not found, creating it"),
                    entry.record.location(),
                );
            }
            if !entry.record.ignored {
                merge_into(registry.ensure(&target), entry);
            }
            tracing::debug!(%name, %target, "merged override");
            ctx.externals.insert(name);
        }
    }
}

/// Final class an override applies to. Overrides of overrides are followed
/// to the class at the end of the chain.
fn resolve_target(registry: &ClassRegistry, name: &str) -> Option<String> {
    let mut seen = FxHashSet::default();
    seen.insert(name.to_string());
    let mut current = registry.get(name)?.record.meta.class.override_target.clone()?;
    loop {
        if !seen.insert(current.clone()) {
            return None;
        }
        match registry
            .get(&current)
            .and_then(|entry| entry.record.meta.class.override_target.clone())
        {
            Some(next) => current = next,
            None => return Some(current),
        }
    }
}

fn merge_into(target: &mut ClassEntry, source: ClassEntry) {
    let source_name = source.record.name.clone();

    if let Some(doc) = source.record.meta.doc.as_deref().filter(|doc| !doc.trim().is_empty()) {
        target
            .record
            .meta
            .append_doc(&format!("**From override `{source_name}`:** {doc}"));
    }
    target.record.files.extend(source.record.files);

    for mut member in source.members {
        if member.ignored {
            continue;
        }
        let existing = target
            .members
            .iter_mut()
            .find(|m| m.tag == member.tag && m.name == member.name);
        match existing {
            Some(existing) => {
                match member.meta.doc.as_deref().filter(|doc| !doc.trim().is_empty()) {
                    Some(doc) => existing
                        .meta
                        .append_doc(&format!("**From override `{source_name}`:** {doc}")),
                    None => existing
                        .meta
                        .append_doc(&format!("**Overridden in `{source_name}`.**")),
                }
                existing.files.extend(member.files);
            }
            None => {
                member
                    .meta
                    .append_doc(&format!("**Defined in override `{source_name}`.**"));
                target.push_member(member);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quire_config::DocsConfig;

    use super::*;
    use crate::model::TagName;
    use crate::passes::test_support::{class, member, registry, run, snapshot};

    fn override_of(name: &str, target: &str) -> ClassEntry {
        let mut entry = class(name);
        entry.record.meta.class.override_target = Some(target.to_string());
        entry
    }

    #[test]
    fn members_move_to_target() {
        let mut panel = class("Panel");
        let mut show = member(TagName::Method, "show");
        show.meta.doc = Some("Shows it.".to_string());
        panel.push_member(show);

        let mut patch = override_of("Patch", "Panel");
        patch.push_member(member(TagName::Method, "show"));
        patch.push_member(member(TagName::Method, "hide"));

        let mut registry = registry(vec![panel, patch]);
        let config = DocsConfig::default();
        let (externals, _) = run(&OverridePass, &mut registry, &config);
        assert!(externals.contains("Patch"));
        assert!(registry.get("Patch").is_none());

        let panel = registry.get("Panel").unwrap();
        assert_eq!(panel.members.len(), 2);
        assert_eq!(
            panel.members[0].meta.doc.as_deref(),
            Some("Shows it.\n\n**Overridden in `Patch`.**")
        );
        assert_eq!(panel.members[1].owner.as_deref(), Some("Panel"));
        assert_eq!(
            panel.members[1].meta.doc.as_deref(),
            Some("**Defined in override `Patch`.**")
        );
        assert_eq!(panel.record.files.len(), 2);

        let once = snapshot(&registry);
        run(&OverridePass, &mut registry, &config);
        assert_eq!(snapshot(&registry), once);
    }

    #[test]
    fn missing_target_is_created() {
        let mut patch = override_of("Patch", "Ext.Missing");
        patch.push_member(member(TagName::Cfg, "width"));
        let mut registry = registry(vec![patch]);

        let (_, diagnostics) = run(&OverridePass, &mut registry, &DocsConfig::default());
        let target = registry.get("Ext.Missing").unwrap();
        assert_eq!(target.members[0].name, "width");
        assert_eq!(diagnostics.of_category(Category::Override).count(), 1);
    }

    #[test]
    fn chained_overrides_reach_the_real_class() {
        for first_listed_first in [true, false] {
            let base = class("Base");
            let mut first = override_of("First", "Base");
            first.push_member(member(TagName::Method, "a"));
            let mut second = override_of("Second", "First");
            second.push_member(member(TagName::Method, "b"));
            let entries = if first_listed_first {
                vec![base, first, second]
            } else {
                vec![base, second, first]
            };
            let mut registry = registry(entries);

            let (externals, _) = run(&OverridePass, &mut registry, &DocsConfig::default());
            assert_eq!(registry.names(), ["Base"]);
            assert_eq!(registry.get("Base").unwrap().members.len(), 2);
            assert_eq!(externals.len(), 2);
        }
    }

    #[test]
    fn looping_overrides_are_dropped() {
        let real = class("Real");
        let mut a = override_of("A", "B");
        a.push_member(member(TagName::Method, "fromA"));
        let b = override_of("B", "A");
        let mut s = override_of("S", "S");
        s.push_member(member(TagName::Cfg, "fromS"));
        let mut registry = registry(vec![real, a, b, s]);

        let (externals, diagnostics) = run(&OverridePass, &mut registry, &DocsConfig::default());
        assert_eq!(registry.names(), ["Real"]);
        assert!(registry.get("Real").unwrap().members.is_empty());
        assert!(
            registry
                .iter()
                .all(|entry| entry.record.meta.class.override_target.is_none())
        );
        for name in ["A", "B", "S"] {
            assert!(externals.contains(name), "{name} should be external");
        }
        assert_eq!(diagnostics.of_category(Category::Override).count(), 3);
    }
}

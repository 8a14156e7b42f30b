use super::{LocalPass, PassContext};
use crate::aggregator::{ClassEntry, ClassRegistry};
use crate::model::{DeclarationRecord, Metadata, Param, ReturnDoc, TagName};

/// Generates getter and setter methods for accessor cfgs, plus the change
/// event of evented ones.
pub struct AccessorPass;

impl LocalPass for AccessorPass {
    fn name(&self) -> &'static str {
        "accessors"
    }

    fn process(&self, registry: &mut ClassRegistry, _ctx: &mut PassContext<'_>) {
        for entry in registry.iter_mut() {
            if entry.record.ignored {
                continue;
            }
            let generated = generate_for_class(entry);
            entry.members.extend(generated);
        }
    }
}

fn generate_for_class(entry: &ClassEntry) -> Vec<DeclarationRecord> {
    let class_name = entry.name().to_string();
    let mut generated: Vec<DeclarationRecord> = Vec::new();
    let exists = |generated: &[DeclarationRecord], tag: TagName, name: &str| {
        entry.has_member(tag, name) || generated.iter().any(|m| m.tag == tag && m.name == name)
    };

    for cfg in entry.members.iter().filter(|m| m.tag == TagName::Cfg && !m.ignored) {
        if !cfg.meta.accessor {
            continue;
        }
        let suffix = upcase_first(&cfg.name);

        let getter_name = format!("get{suffix}");
        if !exists(&generated, TagName::Method, &getter_name) {
            let mut getter = derived(cfg, TagName::Method, getter_name);
            getter.meta.doc = Some(format!("Returns the value of {{@link #cfg-{}}}.", cfg.name));
            getter.meta.returns = Some(ReturnDoc {
                type_name: cfg.meta.type_name.clone(),
                doc: None,
            });
            generated.push(getter);
        }

        let setter_name = format!("set{suffix}");
        if !exists(&generated, TagName::Method, &setter_name) {
            let mut setter = derived(cfg, TagName::Method, setter_name);
            setter.meta.doc = Some(format!("Sets the value of {{@link #cfg-{}}}.", cfg.name));
            setter.meta.params = vec![typed_param(&cfg.name, cfg.meta.type_name.as_deref(), None)];
            generated.push(setter);
        }

        if cfg.meta.evented {
            let event_name = format!("{}change", cfg.name.to_lowercase());
            if !exists(&generated, TagName::Event, &event_name) {
                let mut event = derived(cfg, TagName::Event, event_name);
                event.meta.doc = Some(format!(
                    "Fires when the {{@link #cfg-{name}}} configuration is changed by {{@link #method-set{suffix}}}.",
                    name = cfg.name
                ));
                let type_name = cfg.meta.type_name.as_deref();
                event.meta.params = vec![
                    typed_param("this", Some(&class_name), Some(format!("The {class_name} instance."))),
                    typed_param("value", type_name, Some("The new value being set.".to_string())),
                    typed_param("oldValue", type_name, Some("The existing value.".to_string())),
                ];
                generated.push(event);
            }
        }
    }
    generated
}

/// Record derived from `cfg`, sharing its owner, provenance and visibility.
fn derived(cfg: &DeclarationRecord, tag: TagName, name: String) -> DeclarationRecord {
    DeclarationRecord {
        tag,
        name,
        owner: cfg.owner.clone(),
        files: cfg.files.clone(),
        meta: Metadata {
            visibility: cfg.meta.visibility,
            is_static: cfg.meta.is_static,
            deprecated: cfg.meta.deprecated.clone(),
            since: cfg.meta.since.clone(),
            autogenerated: true,
            ..Metadata::default()
        },
        ignored: false,
    }
}

fn typed_param(name: &str, type_name: Option<&str>, doc: Option<String>) -> Param {
    Param {
        name: name.to_string(),
        type_name: type_name.map(str::to_string),
        doc,
        optional: false,
        default: None,
    }
}

fn upcase_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use quire_config::DocsConfig;

    use super::*;
    use crate::model::Visibility;
    use crate::passes::test_support::{class, member, registry, run, snapshot};

    fn accessor_cfg(name: &str) -> DeclarationRecord {
        let mut cfg = member(TagName::Cfg, name);
        cfg.meta.accessor = true;
        cfg.meta.type_name = Some("String".to_string());
        cfg.meta.visibility = Visibility::Protected;
        cfg
    }

    #[test]
    fn synthesizes_getter_and_setter() {
        let mut panel = class("Panel");
        panel.push_member(accessor_cfg("title"));
        panel.push_member(member(TagName::Cfg, "plain"));
        let mut registry = registry(vec![panel]);

        run(&AccessorPass, &mut registry, &DocsConfig::default());
        let panel = registry.get("Panel").unwrap();

        let getter = panel.find_member(TagName::Method, "getTitle").unwrap();
        assert_eq!(getter.owner.as_deref(), Some("Panel"));
        assert_eq!(getter.meta.visibility, Visibility::Protected);
        assert!(getter.meta.autogenerated);
        assert_eq!(
            getter.meta.returns.as_ref().and_then(|r| r.type_name.as_deref()),
            Some("String")
        );

        let setter = panel.find_member(TagName::Method, "setTitle").unwrap();
        assert_eq!(setter.meta.params.len(), 1);
        assert_eq!(setter.meta.params[0].name, "title");
        assert_eq!(setter.meta.params[0].type_name.as_deref(), Some("String"));

        assert!(panel.find_member(TagName::Method, "getPlain").is_none());
        assert_eq!(panel.members.len(), 4);
    }

    #[test]
    fn evented_cfg_gets_change_event() {
        let mut cfg = accessor_cfg("activeItem");
        cfg.meta.evented = true;
        let mut card = class("Card");
        card.push_member(cfg);
        let mut registry = registry(vec![card]);

        run(&AccessorPass, &mut registry, &DocsConfig::default());
        let event = registry
            .get("Card")
            .unwrap()
            .find_member(TagName::Event, "activeitemchange")
            .unwrap();
        let names: Vec<&str> = event.meta.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["this", "value", "oldValue"]);
        assert_eq!(event.meta.params[0].type_name.as_deref(), Some("Card"));
    }

    #[test]
    fn existing_methods_win_and_pass_is_idempotent() {
        let mut panel = class("Panel");
        panel.push_member(accessor_cfg("title"));
        let mut custom = member(TagName::Method, "getTitle");
        custom.meta.doc = Some("Custom getter.".to_string());
        panel.push_member(custom);
        let mut registry = registry(vec![panel]);

        let config = DocsConfig::default();
        run(&AccessorPass, &mut registry, &config);
        let once = snapshot(&registry);
        run(&AccessorPass, &mut registry, &config);
        assert_eq!(snapshot(&registry), once);

        let panel = registry.get("Panel").unwrap();
        let getters: Vec<_> = panel
            .members
            .iter()
            .filter(|m| m.name == "getTitle")
            .collect();
        assert_eq!(getters.len(), 1);
        assert_eq!(getters[0].meta.doc.as_deref(), Some("Custom getter."));
    }
}

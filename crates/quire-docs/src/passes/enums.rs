use super::{LocalPass, PassContext};
use crate::aggregator::{ClassEntry, ClassRegistry};
use crate::diagnostics::{Category, Diagnostics};
use crate::eval::{Value, evaluate_value};
use crate::model::{DeclarationRecord, Metadata, TagName};

/// Type given to enums whose values are of different kinds.
const MIXED_TYPE: &str = "Mixed";

/// Expands the value set of `@enum` classes into one property per value.
pub struct EnumPass;

impl LocalPass for EnumPass {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn process(&self, registry: &mut ClassRegistry, ctx: &mut PassContext<'_>) {
        for entry in registry.iter_mut() {
            if entry.record.ignored || entry.record.meta.class.enum_spec.is_none() {
                continue;
            }
            expand(entry, ctx.diagnostics);
        }
    }
}

/// Name, default and type of one enum value.
struct EnumValue {
    name: String,
    default: String,
    type_name: Option<&'static str>,
}

fn expand(entry: &mut ClassEntry, diagnostics: &mut Diagnostics) {
    let Some(spec) = entry.record.meta.class.enum_spec.clone() else {
        return;
    };

    let values = match spec.values.as_ref().map(evaluate_value) {
        Some(Ok(value)) => enum_values(value),
        Some(Err(error)) => {
            diagnostics.warn(
                Category::Enum,
                format!("Unable to evaluate values of enum {}: {error}", entry.name()),
                entry.record.location(),
            );
            Vec::new()
        }
        None => Vec::new(),
    };

    let type_name = spec
        .type_name
        .clone()
        .or_else(|| common_type(values.iter().map(|v| v.type_name)))
        .or_else(|| {
            common_type(
                entry
                    .members
                    .iter()
                    .filter(|m| m.tag == TagName::Property)
                    .map(|m| m.meta.type_name.as_deref()),
            )
        });

    let mut added: Vec<DeclarationRecord> = Vec::new();
    for value in values {
        // repeated values collapse into the first property of that name
        if added.iter().any(|m| m.name == value.name) {
            continue;
        }
        if let Some(existing) = entry
            .members
            .iter_mut()
            .find(|m| m.tag == TagName::Property && m.name == value.name)
        {
            if existing.meta.default.is_none() {
                existing.meta.default = Some(value.default);
            }
            continue;
        }
        added.push(DeclarationRecord {
            tag: TagName::Property,
            name: value.name,
            owner: Some(entry.record.name.clone()),
            files: entry.record.files.clone(),
            meta: Metadata {
                default: Some(value.default),
                autogenerated: true,
                ..Metadata::default()
            },
            ignored: false,
        });
    }
    entry.members.extend(added);

    if let Some(type_name) = &type_name {
        for member in entry
            .members
            .iter_mut()
            .filter(|m| m.tag == TagName::Property && !m.ignored && m.meta.type_name.is_none())
        {
            member.meta.type_name = Some(type_name.clone());
        }
    }
    if let Some(spec) = entry.record.meta.class.enum_spec.as_mut() {
        spec.type_name = type_name;
    }
}

fn enum_values(value: Value) -> Vec<EnumValue> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| EnumValue {
                name: item.to_string(),
                default: item.to_literal(),
                type_name: item.type_name(),
            })
            .collect(),
        Value::Object(entries) => entries
            .into_iter()
            .map(|(key, item)| EnumValue {
                name: key,
                default: item.to_literal(),
                type_name: item.type_name(),
            })
            .collect(),
        single => vec![EnumValue {
            name: single.to_string(),
            default: single.to_literal(),
            type_name: single.type_name(),
        }],
    }
}

/// The shared type of all items, `Mixed` when they differ, `None` when
/// there are no items or some have no type.
fn common_type<'a>(types: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    let mut common: Option<&str> = None;
    for type_name in types {
        let type_name = type_name?;
        match common {
            None => common = Some(type_name),
            Some(current) if current != type_name => return Some(MIXED_TYPE.to_string()),
            Some(_) => {}
        }
    }
    common.map(str::to_string)
}

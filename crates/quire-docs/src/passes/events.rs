use quire_config::EventCompatibility;

use super::{LocalPass, PassContext};
use crate::aggregator::ClassRegistry;
use crate::model::{CodeStyle, Param, TagName};

const OPTIONS_PARAM: &str = "eOpts";
const OPTIONS_DOC: &str = "The options object passed to {@link Ext.util.Observable#addListener}.";

/// Brings event declarations to the Ext4 calling convention: lowercase
/// names and a trailing options parameter.
pub struct Ext4EventsPass;

impl Ext4EventsPass {
    fn applies(mode: EventCompatibility, registry: &ClassRegistry) -> bool {
        match mode {
            EventCompatibility::Ext4 => true,
            EventCompatibility::Legacy => false,
            EventCompatibility::Auto => registry
                .iter()
                .any(|entry| entry.record.meta.class.code_style == CodeStyle::ExtDefine),
        }
    }
}

impl LocalPass for Ext4EventsPass {
    fn name(&self) -> &'static str {
        "ext4_events"
    }

    fn process(&self, registry: &mut ClassRegistry, ctx: &mut PassContext<'_>) {
        if !Self::applies(ctx.config.event_compatibility, registry) {
            return;
        }
        for entry in registry.iter_mut() {
            if entry.record.ignored {
                continue;
            }
            for event in entry
                .members
                .iter_mut()
                .filter(|m| m.tag == TagName::Event && !m.ignored)
            {
                event.name = event.name.to_lowercase();
                if !event.meta.params.iter().any(|p| p.name == OPTIONS_PARAM) {
                    event
                        .meta
                        .params
                        .push(Param::new(OPTIONS_PARAM).with_type("Object").with_doc(OPTIONS_DOC));
                }
            }
        }
    }
}

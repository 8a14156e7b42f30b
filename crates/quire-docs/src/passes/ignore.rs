use super::{LocalPass, PassContext};
use crate::aggregator::ClassRegistry;

/// Marks records carrying `@ignore`, and every member of an ignored class.
pub struct IgnorePass;

impl LocalPass for IgnorePass {
    fn name(&self) -> &'static str {
        "ignore"
    }

    fn process(&self, registry: &mut ClassRegistry, _ctx: &mut PassContext<'_>) {
        for entry in registry.iter_mut() {
            let class_ignored = entry.record.ignored || entry.record.meta.ignore;
            entry.record.ignored = class_ignored;
            for member in &mut entry.members {
                member.ignored = member.ignored || class_ignored || member.meta.ignore;
            }
        }
    }
}

//! Passes over the class registry, run between aggregation and filtering.
//!
//! Every pass is idempotent and leaves ignored records alone.

mod accessors;
mod enums;
mod events;
mod ignore;
mod overrides;

use indexmap::IndexSet;
use quire_config::DocsConfig;

use crate::aggregator::ClassRegistry;
use crate::diagnostics::Diagnostics;

pub use accessors::AccessorPass;
pub use enums::EnumPass;
pub use events::Ext4EventsPass;
pub use ignore::IgnorePass;
pub use overrides::OverridePass;

/// Shared state handed to each local pass.
pub struct PassContext<'a> {
    pub config: &'a DocsConfig,
    /// Names treated as external classes; the override pass adds to it.
    pub externals: &'a mut IndexSet<String>,
    pub diagnostics: &'a mut Diagnostics,
}

pub trait LocalPass {
    fn name(&self) -> &'static str;

    fn process(&self, registry: &mut ClassRegistry, ctx: &mut PassContext<'_>);
}

/// The local passes in the order they must run.
pub fn local_passes() -> Vec<Box<dyn LocalPass>> {
    vec![
        Box::new(IgnorePass),
        Box::new(AccessorPass),
        Box::new(Ext4EventsPass),
        Box::new(EnumPass),
        Box::new(OverridePass),
    ]
}

pub fn run_local_passes(registry: &mut ClassRegistry, ctx: &mut PassContext<'_>) {
    for pass in local_passes() {
        tracing::debug!(pass = pass.name(), "running local pass");
        pass.process(registry, ctx);
    }
}

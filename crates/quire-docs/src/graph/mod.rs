//! Passes over the relations graph, run after filtering.
//!
//! Cycle detection runs first because the later passes walk the class
//! hierarchy. A pass returning an error stops the run.

mod circular;
mod importer;
mod inherit_doc;
mod lint;
mod return_values;

use quire_config::DocsConfig;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::relations::RelationsGraph;

pub use circular::CircularDepsPass;
pub use importer::{
    ExportedClass, ExportedMember, ExportedVersion, ImportedVersion, ImporterPass, export,
    load_import, load_imports,
};
pub use inherit_doc::InheritDocPass;
pub use lint::LintPass;
pub use return_values::ReturnValuesPass;

/// Shared state handed to each graph pass.
pub struct GraphContext<'a> {
    pub config: &'a DocsConfig,
    /// Earlier releases, oldest first.
    pub imports: &'a [ImportedVersion],
    pub diagnostics: &'a mut Diagnostics,
}

pub trait GraphPass {
    fn name(&self) -> &'static str;

    fn process(&self, graph: &mut RelationsGraph, ctx: &mut GraphContext<'_>) -> Result<()>;
}

/// The graph passes in the order they must run.
pub fn graph_passes() -> Vec<Box<dyn GraphPass>> {
    vec![
        Box::new(CircularDepsPass),
        Box::new(InheritDocPass),
        Box::new(ImporterPass),
        Box::new(ReturnValuesPass),
        Box::new(LintPass),
    ]
}

pub fn run_graph_passes(graph: &mut RelationsGraph, ctx: &mut GraphContext<'_>) -> Result<()> {
    for pass in graph_passes() {
        tracing::debug!(pass = pass.name(), "running graph pass");
        pass.process(graph, ctx)?;
    }
    Ok(())
}

use rustc_hash::FxHashSet;

use super::{GraphContext, GraphPass};
use crate::diagnostics::Category;
use crate::error::{DocsError, Result};
use crate::relations::RelationsGraph;

/// Rejects class hierarchies with cycles through `extends` (and mixins,
/// unless disabled in the configuration).
pub struct CircularDepsPass;

impl GraphPass for CircularDepsPass {
    fn name(&self) -> &'static str {
        "circular_deps"
    }

    fn process(&self, graph: &mut RelationsGraph, ctx: &mut GraphContext<'_>) -> Result<()> {
        let follow_mixins = ctx.config.check_mixin_cycles;
        let mut finished: FxHashSet<String> = FxHashSet::default();

        for name in graph.class_names() {
            let mut path = Vec::new();
            if let Some(chain) = find_cycle(graph, name, follow_mixins, &mut path, &mut finished) {
                let class = name.to_string();
                let error = DocsError::CircularDependency { class, chain };
                let location = graph.get(name).and_then(|c| c.location());
                ctx.diagnostics.fatal(Category::Cycle, error.to_string(), location);
                return Err(error);
            }
        }
        Ok(())
    }
}

/// Depth-first walk; `path` holds the classes on the current branch and
/// `finished` the classes already known to be cycle-free.
fn find_cycle(
    graph: &RelationsGraph,
    name: &str,
    follow_mixins: bool,
    path: &mut Vec<String>,
    finished: &mut FxHashSet<String>,
) -> Option<Vec<String>> {
    if let Some(start) = path.iter().position(|seen| seen == name) {
        let mut chain = path[start..].to_vec();
        chain.push(name.to_string());
        return Some(chain);
    }
    if finished.contains(name) {
        return None;
    }
    let class = graph.get(name)?;

    path.push(name.to_string());
    let parent = class.parent().into_iter();
    let mixins = class.mixins().iter().map(String::as_str).filter(|_| follow_mixins);
    for next in parent.chain(mixins) {
        if let Some(chain) = find_cycle(graph, next, follow_mixins, path, finished) {
            return Some(chain);
        }
    }
    path.pop();
    finished.insert(name.to_string());
    None
}

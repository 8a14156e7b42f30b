//! Merges the exports of earlier releases into the current graph.
//!
//! An export is a JSON document listing classes and their members with
//! docs. Imports are given oldest first; `@since` becomes the oldest
//! version containing an item, and items absent from every import are
//! marked new.

use std::fs;

use indexmap::IndexMap;
use quire_config::ImportSpec;
use serde::{Deserialize, Serialize};

use super::{GraphContext, GraphPass};
use crate::error::{DocsError, Result};
use crate::model::{Metadata, TagName};
use crate::relations::RelationsGraph;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportedVersion {
    #[serde(default)]
    pub classes: Vec<ExportedClass>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedClass {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub members: Vec<ExportedMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedMember {
    pub name: String,
    #[serde(rename = "tagname")]
    pub tag: TagName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// One earlier release, indexed by class name.
#[derive(Debug, Clone, Default)]
pub struct ImportedVersion {
    pub version: String,
    classes: IndexMap<String, ExportedClass>,
}

impl ImportedVersion {
    pub fn new(version: impl Into<String>, export: ExportedVersion) -> Self {
        Self {
            version: version.into(),
            classes: export
                .classes
                .into_iter()
                .map(|class| (class.name.clone(), class))
                .collect(),
        }
    }

    pub fn class(&self, name: &str) -> Option<&ExportedClass> {
        self.classes.get(name)
    }

    pub fn member(&self, class: &str, tag: TagName, name: &str) -> Option<&ExportedMember> {
        self.class(class)?
            .members
            .iter()
            .find(|m| m.tag == tag && m.name == name)
    }
}

pub fn load_import(spec: &ImportSpec) -> Result<ImportedVersion> {
    let text = fs::read_to_string(&spec.path).map_err(|error| DocsError::Io {
        path: spec.path.clone(),
        error,
    })?;
    let export: ExportedVersion = serde_json::from_str(&text).map_err(|e| DocsError::Import {
        path: spec.path.clone(),
        message: e.to_string(),
    })?;
    tracing::debug!(version = %spec.version, classes = export.classes.len(), "loaded import");
    Ok(ImportedVersion::new(&spec.version, export))
}

/// Loads every configured import, keeping their order.
pub fn load_imports(specs: &[ImportSpec]) -> Result<Vec<ImportedVersion>> {
    specs.iter().map(load_import).collect()
}

/// Export of the current graph in the format [`load_import`] reads.
pub fn export(graph: &RelationsGraph) -> ExportedVersion {
    let classes = graph
        .iter()
        .map(|class| ExportedClass {
            name: class.name.clone(),
            doc: class.meta.doc.clone(),
            members: class
                .members
                .iter()
                .map(|member| ExportedMember {
                    name: member.name.clone(),
                    tag: member.tag,
                    doc: member.meta.doc.clone(),
                })
                .collect(),
        })
        .collect();
    ExportedVersion { classes }
}

pub struct ImporterPass;

impl GraphPass for ImporterPass {
    fn name(&self) -> &'static str {
        "importer"
    }

    fn process(&self, graph: &mut RelationsGraph, ctx: &mut GraphContext<'_>) -> Result<()> {
        let imports = ctx.imports;
        if imports.is_empty() {
            return Ok(());
        }

        for class in graph.iter_mut() {
            let name = class.name.clone();
            merge_history(&mut class.meta, imports, |version| {
                version.class(&name).map(|c| c.doc.as_deref())
            });
            for member in &mut class.members {
                let (tag, member_name) = (member.tag, member.name.clone());
                merge_history(&mut member.meta, imports, |version| {
                    version
                        .member(&name, tag, &member_name)
                        .map(|m| m.doc.as_deref())
                });
            }
        }
        Ok(())
    }
}

/// `find` returns `Some(doc)` when the item exists in a version.
fn merge_history<'v, F>(meta: &mut Metadata, imports: &'v [ImportedVersion], find: F)
where
    F: Fn(&'v ImportedVersion) -> Option<Option<&'v str>>,
{
    let first_seen = imports.iter().find(|version| find(*version).is_some());
    match first_seen {
        Some(version) => {
            if meta.since.is_none() {
                meta.since = Some(version.version.clone());
            }
            meta.is_new = false;
        }
        None => meta.is_new = true,
    }

    if !meta.has_doc() {
        meta.doc = imports
            .iter()
            .rev()
            .filter_map(|version| find(version).flatten())
            .find(|doc| !doc.trim().is_empty())
            .map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::graph::test_support::{class, graph, member, run, snapshot};

    fn version(name: &str, json: serde_json::Value) -> ImportedVersion {
        ImportedVersion::new(name, serde_json::from_value(json).unwrap())
    }

    fn history() -> Vec<ImportedVersion> {
        vec![
            version(
                "1.0",
                serde_json::json!({
                    "classes": [
                        { "name": "Panel", "members": [
                            { "name": "show", "tagname": "method" }
                        ]}
                    ]
                }),
            ),
            version(
                "2.0",
                serde_json::json!({
                    "classes": [
                        { "name": "Panel", "doc": "A panel.", "members": [
                            { "name": "show", "tagname": "method", "doc": "Shows it." },
                            { "name": "hide", "tagname": "method", "doc": "Hides it." }
                        ]}
                    ]
                }),
            ),
        ]
    }

    #[test]
    fn since_and_new_from_history() {
        let mut panel = class("Panel", None);
        panel.members.push(member("Panel", TagName::Method, "show", None));
        panel.members.push(member("Panel", TagName::Method, "hide", Some("Hides.")));
        panel.members.push(member("Panel", TagName::Method, "toggle", None));
        let mut graph = graph(vec![panel, class("Window", Some("Panel"))]);

        let imports = history();
        let (result, _) = run(&ImporterPass, &mut graph, &imports);
        assert!(result.is_ok());

        let panel = graph.get("Panel").unwrap();
        assert_eq!(panel.meta.since.as_deref(), Some("1.0"));
        assert_eq!(panel.meta.doc.as_deref(), Some("A panel."));
        assert!(!panel.meta.is_new);

        let show = &panel.members[0];
        assert_eq!(show.meta.since.as_deref(), Some("1.0"));
        assert_eq!(show.meta.doc.as_deref(), Some("Shows it."));
        let hide = &panel.members[1];
        assert_eq!(hide.meta.since.as_deref(), Some("2.0"));
        assert_eq!(hide.meta.doc.as_deref(), Some("Hides."));
        let toggle = &panel.members[2];
        assert!(toggle.meta.is_new);
        assert_eq!(toggle.meta.since, None);

        assert!(graph.get("Window").unwrap().meta.is_new);

        let once = snapshot(&graph);
        let (result, _) = run(&ImporterPass, &mut graph, &imports);
        assert!(result.is_ok());
        assert_eq!(snapshot(&graph), once);
    }

    #[test]
    fn explicit_since_is_kept() {
        let mut panel = class("Panel", None);
        panel.meta.since = Some("0.9".to_string());
        let mut graph = graph(vec![panel]);
        let (result, _) = run(&ImporterPass, &mut graph, &history());
        assert!(result.is_ok());
        assert_eq!(graph.get("Panel").unwrap().meta.since.as_deref(), Some("0.9"));
    }

    #[test]
    fn no_imports_is_a_no_op() {
        let mut graph = graph(vec![class("Panel", None)]);
        let before = snapshot(&graph);
        let (result, _) = run(&ImporterPass, &mut graph, &[]);
        assert!(result.is_ok());
        assert_eq!(snapshot(&graph), before);
    }

    #[test]
    fn export_loads_back() {
        let mut panel = class("Panel", None);
        panel.meta.doc = Some("A panel.".to_string());
        panel.members.push(member("Panel", TagName::Cfg, "title", Some("Title.")));
        let graph = graph(vec![panel]);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&export(&graph)).unwrap().as_bytes())
            .unwrap();
        let spec = ImportSpec {
            version: "3.0".to_string(),
            path: file.path().to_path_buf(),
        };

        let imported = load_import(&spec).unwrap();
        assert_eq!(imported.version, "3.0");
        assert_eq!(imported.class("Panel").unwrap().doc.as_deref(), Some("A panel."));
        assert_eq!(
            imported.member("Panel", TagName::Cfg, "title").unwrap().doc.as_deref(),
            Some("Title.")
        );
    }

    #[test]
    fn malformed_import_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let spec = ImportSpec {
            version: "1.0".to_string(),
            path: file.path().to_path_buf(),
        };
        assert!(matches!(load_import(&spec), Err(DocsError::Import { .. })));

        let missing = ImportSpec {
            version: "1.0".to_string(),
            path: "does/not/exist.json".into(),
        };
        assert!(matches!(load_imports(&[missing]), Err(DocsError::Io { .. })));
    }
}

use std::path::Path;

use quire_config::DocsConfig;
use quire_docs::graph::{GraphContext, run_graph_passes};
use quire_docs::{
    BatchParser, Category, Diagnostics, DocCommentParser, DocsError, FileParseResult,
    GLOBAL_CLASS, Pipeline, SourceParser, TagName, aggregate,
};

const GLOBALS: &str = "/**\n * Formats a value.\n * @method format\n */\n/**\n * @property {String} VERSION\n */\n";

const BASE: &str = r#"/**
 * Base component.
 */
Ext.define('App.Base', {
    extend: 'Ext.Component',
    config: {
        /**
         * @cfg {String} title
         * The title.
         */
        title: ''
    },
    /**
     * @event BeforeShow
     * Fires before showing.
     * @param {App.Base} this The component.
     */
    /**
     * Shows the component.
     * @param {Boolean} animate Animate it.
     * @return {App.Base} this
     */
    show: function(animate) {
        return this;
    },
    /**
     * Whether it is visible.
     */
    isVisible: function() {
        return !this.hidden;
    }
});
"#;

const PANEL: &str = r#"/**
 * A panel.
 * @class App.Panel
 * @extends App.Base
 */
/**
 * @method show
 */
"#;

const PATCH: &str = r#"/**
 * @class App.PanelPatch
 * @override App.Panel
 */
/**
 * Hides the panel.
 * @method hide
 */
"#;

fn parse(path: &str, source: &str) -> FileParseResult {
    DocCommentParser::new()
        .parse(Path::new(path), source)
        .expect("source should parse")
}

fn files() -> Vec<FileParseResult> {
    vec![
        parse("globals.js", GLOBALS),
        parse("base.js", BASE),
        parse("panel.js", PANEL),
        parse("patch.js", PATCH),
    ]
}

fn config(drop_global_class: bool) -> DocsConfig {
    DocsConfig {
        drop_global_class,
        ..DocsConfig::default()
    }
}

#[test]
fn every_member_record_has_exactly_one_owner() {
    let files = files();
    let member_records = files
        .iter()
        .flat_map(|file| &file.records)
        .filter(|record| record.tag != TagName::Class)
        .count();

    let registry = aggregate(&files, &mut Diagnostics::new());
    let placed: usize = registry.iter().map(|entry| entry.members.len()).sum();
    assert_eq!(placed, member_records);

    for entry in registry.iter() {
        for member in &entry.members {
            assert_eq!(member.owner.as_deref(), Some(entry.name()));
        }
    }
    let global = registry.get(GLOBAL_CLASS).unwrap();
    let names: Vec<&str> = global.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["format", "VERSION"]);
}

#[test]
fn overrides_are_folded_into_their_target() {
    let config = config(false);
    let (registry, externals) = Pipeline::new(&config).process_local(&files(), &mut Diagnostics::new());

    assert!(registry.get("App.PanelPatch").is_none());
    assert!(externals.contains("App.PanelPatch"));
    assert!(registry.iter().all(|e| e.record.meta.class.override_target.is_none()));

    let panel = registry.get("App.Panel").unwrap();
    let hide = panel.find_member(TagName::Method, "hide").unwrap();
    assert_eq!(hide.owner.as_deref(), Some("App.Panel"));
    assert_eq!(
        hide.meta.doc.as_deref(),
        Some("Hides the panel.\n\n**Defined in override `App.PanelPatch`.**")
    );
    assert_eq!(panel.members.len(), 2);
}

#[test]
fn full_run_resolves_the_class_graph() {
    let config = config(true);
    let mut diagnostics = Diagnostics::new();
    let graph = Pipeline::new(&config).run(&files(), &mut diagnostics).unwrap();

    assert!(!graph.contains(GLOBAL_CLASS));
    assert!(!graph.contains("App.PanelPatch"));
    assert!(graph.is_external("App.PanelPatch"));
    assert!(graph.is_external("Ext.Component"));

    let base = graph.get("App.Base").unwrap();
    let names: Vec<&str> = base.members.iter().map(|m| m.name.as_str()).collect();
    for expected in ["title", "beforeshow", "show", "isVisible", "getTitle", "setTitle"] {
        assert!(names.contains(&expected), "missing {expected} in {names:?}");
    }

    let event = base.find_member(TagName::Event, "beforeshow").unwrap();
    let params: Vec<&str> = event.meta.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, ["this", "eOpts"]);

    let visible = base.find_member(TagName::Method, "isVisible").unwrap();
    let returns = visible.meta.returns.as_ref().unwrap();
    assert_eq!(returns.type_name.as_deref(), Some("Boolean"));

    let panel = graph.get("App.Panel").unwrap();
    let show = panel.find_member(TagName::Method, "show").unwrap();
    assert!(
        show.meta.doc.as_deref().unwrap().starts_with("Shows the component."),
        "{:?}",
        show.meta.doc
    );
    assert_eq!(show.meta.params[0].type_name.as_deref(), Some("Boolean"));

    let ancestors: Vec<&str> = graph.ancestors("App.Panel").iter().map(|c| c.name.as_str()).collect();
    assert_eq!(ancestors, ["App.Base"]);
}

#[test]
fn dropped_global_class_still_warns_once_per_member() {
    for drop_global in [true, false] {
        let config = config(drop_global);
        let mut diagnostics = Diagnostics::new();
        let graph = Pipeline::new(&config).run(&files(), &mut diagnostics).unwrap();
        assert_eq!(graph.contains(GLOBAL_CLASS), !drop_global);

        let warnings: Vec<String> = diagnostics
            .of_category(Category::Global)
            .map(|d| d.to_string())
            .collect();
        assert_eq!(
            warnings,
            [
                "globals.js:1: [global] Global method: format",
                "globals.js:5: [global] Global property: VERSION"
            ]
        );
        let undocumented_global = format!("No documentation for {GLOBAL_CLASS}");
        assert!(
            diagnostics
                .of_category(Category::NoDoc)
                .all(|d| d.message != undocumented_global)
        );
    }
}

#[test]
fn inheritance_cycle_stops_the_run() {
    let files = vec![
        parse("a.js", "/**\n * @class A\n * @extends B\n */\n"),
        parse("b.js", "/**\n * @class B\n * @extends A\n */\n"),
    ];
    let config = config(false);
    let mut diagnostics = Diagnostics::new();
    let err = Pipeline::new(&config).run(&files, &mut diagnostics).unwrap_err();

    let DocsError::CircularDependency { class, chain } = err else {
        panic!("expected a cycle error");
    };
    assert_eq!(class, "A");
    assert_eq!(chain, ["A", "B", "A"]);
    assert!(diagnostics.has_fatal());
    // lint would complain about both undocumented classes had it run
    assert_eq!(diagnostics.of_category(Category::NoDoc).count(), 0);
}

#[test]
fn graph_passes_are_idempotent() {
    let config = config(false);
    let mut diagnostics = Diagnostics::new();
    let mut graph = Pipeline::new(&config).run(&files(), &mut diagnostics).unwrap();
    let once = serde_json::to_value(&graph).unwrap();

    let mut again = Diagnostics::new();
    let mut ctx = GraphContext {
        config: &config,
        imports: &[],
        diagnostics: &mut again,
    };
    run_graph_passes(&mut graph, &mut ctx).unwrap();
    assert_eq!(serde_json::to_value(&graph).unwrap(), once);
}

#[test]
fn batch_run_over_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut input_files = Vec::new();
    for (name, source) in [("base.js", BASE), ("panel.js", PANEL), ("patch.js", PATCH)] {
        let path = dir.path().join(name);
        std::fs::write(&path, source).unwrap();
        input_files.push(path);
    }
    let config = DocsConfig {
        input_files,
        parallel_jobs: Some(2),
        warnings: quire_config::WarningSettings {
            disabled: vec!["no_doc_param".to_string()],
        },
        ..DocsConfig::default()
    };

    let output = BatchParser::new(config).run().unwrap();
    assert_eq!(output.parsed_files.len(), 3);
    let names: Vec<&str> = output.relations.class_names().collect();
    assert_eq!(names, ["App.Base", "App.Panel"]);
    assert_eq!(output.diagnostics.of_category(Category::NoDocParam).count(), 0);
}

#[test]
fn syntax_error_aborts_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.js");
    std::fs::write(&path, "/** @class Broken */\nExt.define('Broken', {").unwrap();
    let config = DocsConfig {
        input_files: vec![path],
        ..DocsConfig::default()
    };

    let err = BatchParser::new(config).run().unwrap_err();
    assert!(matches!(err, DocsError::Parse { .. }), "{err}");
}

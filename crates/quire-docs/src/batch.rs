//! End-to-end processing of a set of source files.
//!
//! [`BatchParser`] reads and parses the configured files in parallel, then
//! hands the results to a [`Pipeline`], which runs every later stage
//! sequentially in input order:
//!
//! 1. aggregation into classes
//! 2. local passes (ignore, accessors, events, enums, overrides)
//! 3. class filtering and relations
//! 4. graph passes (cycles, inherited docs, imports, return values, lint)

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use quire_config::DocsConfig;
use rayon::prelude::*;

use crate::aggregator::{ClassRegistry, aggregate};
use crate::diagnostics::Diagnostics;
use crate::error::{DocsError, Result};
use crate::filter::filter_classes;
use crate::graph::{GraphContext, ImportedVersion, load_imports, run_graph_passes};
use crate::model::FileParseResult;
use crate::passes::{PassContext, run_local_passes};
use crate::relations::RelationsGraph;
use crate::source::{DocCommentParser, SourceParser};

/// Everything after parsing. Deterministic for a given input order.
pub struct Pipeline<'c> {
    config: &'c DocsConfig,
    imports: Vec<ImportedVersion>,
}

impl<'c> Pipeline<'c> {
    pub fn new(config: &'c DocsConfig) -> Self {
        Self {
            config,
            imports: Vec::new(),
        }
    }

    /// Earlier releases for the importer, oldest first.
    pub fn with_imports(mut self, imports: Vec<ImportedVersion>) -> Self {
        self.imports = imports;
        self
    }

    pub fn run(&self, files: &[FileParseResult], diagnostics: &mut Diagnostics) -> Result<RelationsGraph> {
        let (registry, externals) = self.process_local(files, diagnostics);
        let mut graph = filter_classes(registry, &externals, self.config.drop_global_class, diagnostics);

        let mut ctx = GraphContext {
            config: self.config,
            imports: &self.imports,
            diagnostics,
        };
        run_graph_passes(&mut graph, &mut ctx)?;
        Ok(graph)
    }

    /// Aggregation and local passes. Returns the registry with the external
    /// class names, configured ones plus override classes.
    pub fn process_local(
        &self,
        files: &[FileParseResult],
        diagnostics: &mut Diagnostics,
    ) -> (ClassRegistry, IndexSet<String>) {
        let mut registry = aggregate(files, diagnostics);
        let mut externals = self.config.external_classes.clone();
        let mut ctx = PassContext {
            config: self.config,
            externals: &mut externals,
            diagnostics,
        };
        run_local_passes(&mut registry, &mut ctx);
        (registry, externals)
    }
}

/// Result of a batch run.
#[derive(Debug)]
pub struct BatchOutput {
    pub relations: RelationsGraph,
    /// Per-file parse results, in input order.
    pub parsed_files: Vec<FileParseResult>,
    pub diagnostics: Diagnostics,
}

/// Parses the configured input files and processes them.
pub struct BatchParser<P = DocCommentParser> {
    config: DocsConfig,
    parser: P,
}

impl BatchParser<DocCommentParser> {
    pub fn new(config: DocsConfig) -> Self {
        Self::with_parser(config, DocCommentParser::new())
    }
}

impl<P: SourceParser> BatchParser<P> {
    pub fn with_parser(config: DocsConfig, parser: P) -> Self {
        Self { config, parser }
    }

    pub fn config(&self) -> &DocsConfig {
        &self.config
    }

    /// Validates the configuration, then parses, aggregates and resolves
    /// every input file.
    pub fn run(&self) -> Result<BatchOutput> {
        quire_config::validate_fs(&self.config)?;
        let parsed_files = self.parse_files(&self.config.input_files)?;
        let imports = load_imports(&self.config.imports)?;

        let mut diagnostics = Diagnostics::with_disabled(self.config.warnings.disabled.iter().cloned());
        let relations = Pipeline::new(&self.config)
            .with_imports(imports)
            .run(&parsed_files, &mut diagnostics)?;

        tracing::info!(
            files = parsed_files.len(),
            classes = relations.len(),
            diagnostics = diagnostics.len(),
            "documentation processed"
        );
        Ok(BatchOutput {
            relations,
            parsed_files,
            diagnostics,
        })
    }

    /// Reads and parses `paths` in parallel. Results keep the input order;
    /// the first failure aborts the batch.
    pub fn parse_files(&self, paths: &[PathBuf]) -> Result<Vec<FileParseResult>> {
        let _span = tracing::info_span!("parse_files", files = paths.len()).entered();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.parallel_jobs.unwrap_or(0))
            .build()
            .map_err(|e| DocsError::Other {
                message: format!("failed to start parser threads: {e}"),
            })?;
        pool.install(|| paths.par_iter().map(|path| self.parse_file(path)).collect())
    }

    pub fn parse_file(&self, path: &Path) -> Result<FileParseResult> {
        let source = fs::read_to_string(path).map_err(|error| DocsError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        self.parser.parse(path, &source)
    }
}

#[cfg(test)]
mod tests {
    use quire_config::ConfigError;

    use super::*;
    use crate::model::{DeclarationRecord, SourceLocation, TagName};

    /// Emits one class per file, named after the file stem.
    struct StemParser;

    impl SourceParser for StemParser {
        fn parse(&self, path: &Path, _source: &str) -> Result<FileParseResult> {
            let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let mut result = FileParseResult::new(path);
            result
                .records
                .push(DeclarationRecord::new(TagName::Class, name, SourceLocation::new(path, 1)));
            Ok(result)
        }
    }

    #[test]
    fn parse_results_keep_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..16)
            .map(|i| {
                let path = dir.path().join(format!("C{i}.js"));
                fs::write(&path, "").unwrap();
                path
            })
            .collect();

        let config = DocsConfig {
            input_files: paths.clone(),
            parallel_jobs: Some(4),
            ..DocsConfig::default()
        };
        let output = BatchParser::with_parser(config, StemParser).run().unwrap();

        let parsed: Vec<&Path> = output.parsed_files.iter().map(|f| f.path.as_path()).collect();
        assert_eq!(parsed, paths.iter().map(PathBuf::as_path).collect::<Vec<_>>());
        let classes: Vec<&str> = output.relations.class_names().collect();
        let expected: Vec<String> = (0..16).map(|i| format!("C{i}")).collect();
        assert_eq!(classes, expected);
    }

    #[test]
    fn missing_input_is_rejected_before_parsing() {
        let config = DocsConfig {
            input_files: vec![PathBuf::from("missing/file.js")],
            ..DocsConfig::default()
        };
        let err = BatchParser::with_parser(config, StemParser).run().unwrap_err();
        assert!(matches!(err, DocsError::Config(ConfigError::InputNotFound(_))));
    }

    #[test]
    fn unreadable_file_aborts() {
        let parser = BatchParser::with_parser(DocsConfig::default(), StemParser);
        let err = parser
            .parse_files(&[PathBuf::from("missing/file.js")])
            .unwrap_err();
        assert!(matches!(err, DocsError::Io { .. }));
    }

    #[test]
    fn invalid_config_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.js");
        fs::write(&path, "").unwrap();

        let zero_jobs = DocsConfig {
            input_files: vec![path.clone()],
            parallel_jobs: Some(0),
            ..DocsConfig::default()
        };
        let err = BatchParser::with_parser(zero_jobs, StemParser).run().unwrap_err();
        assert!(matches!(err, DocsError::Config(ConfigError::Validation(_))));

        let mut bare_wildcard = DocsConfig {
            input_files: vec![path],
            ..DocsConfig::default()
        };
        bare_wildcard.external_classes.insert("*".to_string());
        let err = BatchParser::with_parser(bare_wildcard, StemParser).run().unwrap_err();
        assert!(matches!(err, DocsError::Config(ConfigError::Validation(_))));
    }
}

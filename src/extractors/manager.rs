//! Extractor Manager - routes files to language extractors.
//!
//! One manager owns the language registry and fans analysis out over a
//! project tree with rayon. Per-file failures are logged and skipped so a
//! single unreadable file never sinks a project run.

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::ScopegraphError;
use crate::extractors::base::ScopeFileAnalysis;
use crate::extractors::c::CExtractor;
use crate::extractors::go::GoExtractor;
use crate::extractors::python::PythonExtractor;
use crate::extractors::rust::RustExtractor;
use crate::extractors::typescript::TypeScriptExtractor;
use crate::language::LanguageRegistry;

/// Extensions swept up by project analysis.
const PROJECT_EXTENSIONS: &[&str] = &[
    "rs", "py", "pyi", "ts", "mts", "cts", "tsx", "go", "c", "h",
];

/// Directories that hold generated or vendored code, never analyzed.
const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    ".git",
    "__pycache__",
    "vendor",
    "dist",
    ".venv",
];

pub struct ExtractorManager {
    registry: LanguageRegistry,
}

impl Default for ExtractorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorManager {
    pub fn new() -> Self {
        Self {
            registry: LanguageRegistry::with_defaults(),
        }
    }

    pub fn with_registry(registry: LanguageRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn supported_languages(&self) -> Vec<&'static str> {
        self.registry.supported()
    }

    /// Analyze one file from disk, detecting the language by extension.
    pub fn analyze_file(&self, path: &Path) -> Result<ScopeFileAnalysis, ScopegraphError> {
        let file_path = path.to_string_lossy().to_string();
        let language = self.registry.detect_from_path(&file_path)?;
        let content = std::fs::read_to_string(path)?;
        self.analyze_source(file_path, content, language)
    }

    /// Analyze already-loaded source under an explicit language name.
    pub fn analyze_source(
        &self,
        file_path: String,
        content: String,
        language: &str,
    ) -> Result<ScopeFileAnalysis, ScopegraphError> {
        let grammar = self.registry.get(language)?;

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| ScopegraphError::Parse(e.to_string()))?;
        let tree = parser
            .parse(&content, None)
            .ok_or_else(|| ScopegraphError::Parse(format!("parser returned no tree: {file_path}")))?;

        debug!(file = %file_path, language, "extracting scopes");
        let analysis = match language {
            "rust" => RustExtractor::new(file_path, content).extract(&tree),
            "python" => PythonExtractor::new(file_path, content).extract(&tree),
            "typescript" | "tsx" => {
                let language: &'static str = if language == "tsx" { "tsx" } else { "typescript" };
                TypeScriptExtractor::new(language, file_path, content).extract(&tree)
            }
            "go" => GoExtractor::new(file_path, content).extract(&tree),
            "c" => CExtractor::new(file_path, content).extract(&tree),
            other => return Err(ScopegraphError::UnsupportedLanguage(other.to_string())),
        };
        Ok(analysis)
    }

    /// Analyze every supported file under a project root, in parallel.
    ///
    /// Results are keyed by file path; the BTreeMap gives downstream
    /// passes a deterministic iteration order.
    pub fn analyze_project(
        &self,
        root: &Path,
    ) -> Result<BTreeMap<String, ScopeFileAnalysis>, ScopegraphError> {
        let mut paths = Vec::new();
        for extension in PROJECT_EXTENSIONS {
            let pattern = format!("{}/**/*.{}", root.display(), extension);
            for entry in glob::glob(&pattern)
                .map_err(|e| ScopegraphError::Parse(e.to_string()))?
                .flatten()
            {
                if is_skipped(&entry) {
                    continue;
                }
                paths.push(entry);
            }
        }

        let analyses: Vec<(String, ScopeFileAnalysis)> = paths
            .par_iter()
            .filter_map(|path| match self.analyze_file(path) {
                Ok(analysis) => Some((path.to_string_lossy().to_string(), analysis)),
                Err(err) => {
                    warn!(file = %path.display(), %err, "skipping file");
                    None
                }
            })
            .collect();

        Ok(analyses.into_iter().collect())
    }
}

fn is_skipped(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_files_by_extension() {
        let manager = ExtractorManager::new();
        let analysis = manager
            .analyze_source(
                "lib.rs".into(),
                "pub fn hello() {}".into(),
                "rust",
            )
            .unwrap();
        assert_eq!(analysis.language, "rust");
        assert!(analysis.scopes.iter().any(|s| s.name == "hello"));

        let err = manager
            .analyze_source("x.cob".into(), "".into(), "cobol")
            .unwrap_err();
        assert!(matches!(err, ScopegraphError::UnsupportedLanguage(_)));
    }

    #[test]
    fn project_analysis_walks_and_skips_vendored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("shapes.py"), "class Shape:\n    pass\n").unwrap();
        std::fs::write(src.join("main.go"), "package main\n\nfunc main() {}\n").unwrap();

        let vendored = dir.path().join("node_modules").join("pkg");
        std::fs::create_dir_all(&vendored).unwrap();
        std::fs::write(vendored.join("index.ts"), "export const x = 1;\n").unwrap();

        let manager = ExtractorManager::new();
        let project = manager.analyze_project(dir.path()).unwrap();

        assert_eq!(project.len(), 2);
        assert!(project.keys().any(|k| k.ends_with("shapes.py")));
        assert!(project.keys().any(|k| k.ends_with("main.go")));

        let shapes = project
            .values()
            .find(|a| a.language == "python")
            .unwrap();
        assert!(shapes.scopes.iter().any(|s| s.name == "Shape"));
    }

    #[test]
    fn tsx_routes_through_the_typescript_extractor() {
        let manager = ExtractorManager::new();
        let analysis = manager
            .analyze_source(
                "App.tsx".into(),
                "export function App() { return <div/>; }\n".into(),
                "tsx",
            )
            .unwrap();
        assert_eq!(analysis.language, "tsx");
        assert!(analysis.scopes.iter().any(|s| s.name == "App"));
    }
}

//! Import Resolvers - per-language import classification and path
//! resolution.
//!
//! A resolver knows three things about its language: what the project
//! manifest declares as dependencies, which import specifiers are
//! project-local, and how a local specifier maps onto a file on disk.
//! Resolution is fail-closed: a local import that cannot be walked to an
//! existing file resolves to `None` rather than a guess.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub mod c;
pub mod go;
pub mod python;
pub mod rust;
pub mod typescript;

pub use c::CResolver;
pub use go::GoResolver;
pub use python::PythonResolver;
pub use rust::RustResolver;
pub use typescript::TypeScriptResolver;

/// How an import specifier relates to the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportClass {
    /// Explicitly relative to the importing file (`./x`, `..mod`, `super::`)
    Relative,
    /// Project-local by absolute-from-root convention (`crate::`, module path)
    Absolute,
    /// Resolved through a configured alias (`@/components/...`)
    Alias,
    /// Declared third-party dependency
    Package,
    /// Language or standard-library builtin
    Builtin,
    /// None of the above; typically an undeclared package
    Unknown,
}

impl ImportClass {
    pub fn is_project_local(self) -> bool {
        matches!(self, ImportClass::Relative | ImportClass::Absolute | ImportClass::Alias)
    }
}

/// Full classification result for one import specifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedImport {
    pub source: String,
    pub class: ImportClass,
    pub is_local: bool,
    /// Existing file or directory the specifier maps to, when local.
    pub resolved_path: Option<PathBuf>,
}

/// Per-language import intelligence. `load_config` degrades gracefully: a
/// missing manifest leaves the dependency set empty and classification
/// still works on syntax alone.
pub trait ImportResolver: Send + Sync {
    fn language(&self) -> &'static str;

    /// Read the project manifest (Cargo.toml, go.mod, package.json, ...).
    fn load_config(&mut self, project_root: &Path) -> anyhow::Result<()>;

    /// Dependency names the manifest declares.
    fn declared_dependencies(&self) -> &HashSet<String>;

    /// Classify a specifier without touching the filesystem.
    fn classify(&self, spec: &str) -> ImportClass;

    /// Map a local specifier to an existing file, relative to the file
    /// that imports it. Non-local specifiers and dead paths yield `None`.
    fn resolve(&self, spec: &str, current_file: &Path) -> Option<PathBuf>;

    fn is_local_import(&self, spec: &str) -> bool {
        self.classify(spec).is_project_local()
    }

    fn resolve_full(&self, spec: &str, current_file: &Path) -> ResolvedImport {
        let class = self.classify(spec);
        let resolved_path = if class.is_project_local() {
            self.resolve(spec, current_file)
        } else {
            None
        };
        ResolvedImport {
            source: spec.to_string(),
            class,
            is_local: class.is_project_local(),
            resolved_path,
        }
    }
}

/// Resolver for a language name, configured against a project root.
pub fn resolver_for(language: &str, project_root: &Path) -> Option<Box<dyn ImportResolver>> {
    let mut resolver: Box<dyn ImportResolver> = match language {
        "rust" => Box::new(RustResolver::new()),
        "python" => Box::new(PythonResolver::new()),
        "typescript" | "tsx" => Box::new(TypeScriptResolver::new()),
        "go" => Box::new(GoResolver::new()),
        "c" => Box::new(CResolver::new()),
        _ => return None,
    };
    if let Err(err) = resolver.load_config(project_root) {
        tracing::warn!(language, %err, "manifest load failed; continuing without dependency info");
    }
    Some(resolver)
}

/// Walks `base` down through `segments`, accepting either a file with one
/// of `file_extensions` or a directory containing one of `module_roots`.
/// Any missing step fails the whole walk.
pub(crate) fn walk_segments(
    base: &Path,
    segments: &[&str],
    file_extensions: &[&str],
    module_roots: &[&str],
) -> Option<PathBuf> {
    let (last, dirs) = segments.split_last()?;
    let mut dir = base.to_path_buf();
    for segment in dirs {
        dir.push(segment);
        if !dir.is_dir() {
            return None;
        }
    }

    for ext in file_extensions {
        let candidate = dir.join(format!("{last}.{ext}"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    let as_dir = dir.join(last);
    if as_dir.is_dir() {
        for root in module_roots {
            let candidate = as_dir.join(root);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_segments_is_fail_closed() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        std::fs::create_dir_all(base.join("models")).unwrap();
        std::fs::write(base.join("models/shape.py"), "").unwrap();
        std::fs::write(base.join("models/__init__.py"), "").unwrap();

        let hit = walk_segments(base, &["models", "shape"], &["py"], &["__init__.py"]);
        assert!(hit.unwrap().ends_with("models/shape.py"));

        let pkg = walk_segments(base, &["models"], &["py"], &["__init__.py"]);
        assert!(pkg.unwrap().ends_with("models/__init__.py"));

        assert!(walk_segments(base, &["models", "missing"], &["py"], &["__init__.py"]).is_none());
        assert!(walk_segments(base, &["ghost", "shape"], &["py"], &["__init__.py"]).is_none());
    }

    #[test]
    fn full_resolution_bundles_class_and_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("helpers.py"), "").unwrap();
        let resolver = resolver_for("python", dir.path()).unwrap();

        assert!(resolver.is_local_import("helpers"));
        assert!(!resolver.is_local_import("numpy"));

        let local = resolver.resolve_full("helpers", &dir.path().join("app.py"));
        assert_eq!(local.class, ImportClass::Absolute);
        assert!(local.is_local);
        assert!(local.resolved_path.unwrap().ends_with("helpers.py"));

        let external = resolver.resolve_full("numpy", &dir.path().join("app.py"));
        assert_eq!(external.class, ImportClass::Unknown);
        assert!(!external.is_local);
        assert!(external.resolved_path.is_none());
    }

    #[test]
    fn resolver_factory_covers_every_language() {
        let dir = tempfile::tempdir().unwrap();
        for language in ["rust", "python", "typescript", "tsx", "go", "c"] {
            assert!(resolver_for(language, dir.path()).is_some(), "{language}");
        }
        assert!(resolver_for("cobol", dir.path()).is_none());
    }
}

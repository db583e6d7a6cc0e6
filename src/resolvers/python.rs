//! Python import resolver: requirements.txt / pyproject.toml dependencies,
//! dotted module paths, relative-dot imports and `__init__.py` packages.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{walk_segments, ImportClass, ImportResolver};

/// Leading distribution name of a requirement specifier, before any
/// extras, version pins or environment markers.
static REQUIREMENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*").expect("valid regex"));

static STDLIB: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abc", "argparse", "asyncio", "base64", "collections", "contextlib", "copy", "csv",
        "dataclasses", "datetime", "decimal", "enum", "functools", "glob", "hashlib", "heapq",
        "html", "http", "importlib", "inspect", "io", "itertools", "json", "logging", "math",
        "multiprocessing", "os", "pathlib", "pickle", "platform", "queue", "random", "re",
        "shutil", "socket", "sqlite3", "string", "struct", "subprocess", "sys", "tempfile",
        "threading", "time", "traceback", "types", "typing", "unittest", "urllib", "uuid",
        "warnings", "weakref", "xml", "zipfile",
    ]
    .into_iter()
    .collect()
});

pub struct PythonResolver {
    dependencies: HashSet<String>,
    project_root: PathBuf,
}

impl Default for PythonResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonResolver {
    pub fn new() -> Self {
        Self {
            dependencies: HashSet::new(),
            project_root: PathBuf::new(),
        }
    }

    fn add_requirement(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            return;
        }
        // `name==1.0`, `name>=2`, `name[extra]`, bare `name`
        if let Some(name) = REQUIREMENT_NAME.find(line) {
            // Distribution names normalize dashes to underscores on import.
            self.dependencies
                .insert(name.as_str().replace('-', "_").to_lowercase());
        }
    }
}

impl ImportResolver for PythonResolver {
    fn language(&self) -> &'static str {
        "python"
    }

    fn load_config(&mut self, project_root: &Path) -> anyhow::Result<()> {
        self.project_root = project_root.to_path_buf();

        let requirements = project_root.join("requirements.txt");
        if requirements.is_file() {
            let text = std::fs::read_to_string(&requirements)
                .with_context(|| format!("reading {}", requirements.display()))?;
            for line in text.lines() {
                self.add_requirement(line);
            }
        }

        // pyproject dependency arrays: quoted requirement strings, one per
        // line in the common layout.
        let pyproject = project_root.join("pyproject.toml");
        if pyproject.is_file() {
            let text = std::fs::read_to_string(&pyproject)
                .with_context(|| format!("reading {}", pyproject.display()))?;
            let mut in_dependencies = false;
            for line in text.lines() {
                let line = line.trim();
                if line.starts_with("dependencies") && line.contains('[') {
                    in_dependencies = !line.contains(']');
                    continue;
                }
                if in_dependencies {
                    if line.starts_with(']') {
                        in_dependencies = false;
                        continue;
                    }
                    self.add_requirement(line.trim_matches([',', '"', '\'']));
                }
            }
        }
        Ok(())
    }

    fn declared_dependencies(&self) -> &HashSet<String> {
        &self.dependencies
    }

    fn classify(&self, spec: &str) -> ImportClass {
        if spec.starts_with('.') {
            return ImportClass::Relative;
        }
        let root = spec.split('.').next().unwrap_or(spec);
        if STDLIB.contains(root) {
            return ImportClass::Builtin;
        }
        if self.dependencies.contains(&root.to_lowercase()) {
            return ImportClass::Package;
        }
        // A package directory or module at the project root is local.
        if self.project_root.join(root).is_dir()
            || self.project_root.join(format!("{root}.py")).is_file()
        {
            return ImportClass::Absolute;
        }
        ImportClass::Unknown
    }

    fn resolve(&self, spec: &str, current_file: &Path) -> Option<PathBuf> {
        if let Some(stripped) = spec.strip_prefix('.') {
            // Each extra leading dot climbs one package level.
            let mut base = current_file.parent()?.to_path_buf();
            let mut rest = stripped;
            while let Some(more) = rest.strip_prefix('.') {
                base = base.parent()?.to_path_buf();
                rest = more;
            }
            if rest.is_empty() {
                let init = base.join("__init__.py");
                return init.is_file().then_some(init);
            }
            let segments: Vec<&str> = rest.split('.').collect();
            return walk_segments(&base, &segments, &["py", "pyi"], &["__init__.py"]);
        }

        let segments: Vec<&str> = spec.split('.').collect();
        walk_segments(&self.project_root, &segments, &["py", "pyi"], &["__init__.py"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "requests>=2.31\nsciPy==1.11\n")
            .unwrap();
        let app = dir.path().join("app");
        std::fs::create_dir_all(app.join("models")).unwrap();
        std::fs::write(app.join("__init__.py"), "").unwrap();
        std::fs::write(app.join("views.py"), "").unwrap();
        std::fs::write(app.join("models/__init__.py"), "").unwrap();
        std::fs::write(app.join("models/shape.py"), "").unwrap();
        dir
    }

    #[test]
    fn classifies_stdlib_packages_and_local_roots() {
        let dir = project();
        let mut resolver = PythonResolver::new();
        resolver.load_config(dir.path()).unwrap();

        assert_eq!(resolver.classify("os.path"), ImportClass::Builtin);
        assert_eq!(resolver.classify("requests"), ImportClass::Package);
        assert_eq!(resolver.classify("scipy.stats"), ImportClass::Package);
        assert_eq!(resolver.classify(".models"), ImportClass::Relative);
        assert_eq!(resolver.classify("app.models"), ImportClass::Absolute);
        assert_eq!(resolver.classify("flask"), ImportClass::Unknown);
    }

    #[test]
    fn resolves_relative_and_absolute_imports() {
        let dir = project();
        let mut resolver = PythonResolver::new();
        resolver.load_config(dir.path()).unwrap();
        let current = dir.path().join("app/views.py");

        let shape = resolver.resolve(".models.shape", &current).unwrap();
        assert!(shape.ends_with("app/models/shape.py"));

        let package = resolver.resolve(".models", &current).unwrap();
        assert!(package.ends_with("models/__init__.py"));

        let absolute = resolver.resolve("app.views", &current).unwrap();
        assert!(absolute.ends_with("app/views.py"));

        assert!(resolver.resolve(".missing", &current).is_none());
    }
}

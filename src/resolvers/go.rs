//! Go import resolver: go.mod module path and requires, stdlib detection,
//! package directories as resolution targets.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{ImportClass, ImportResolver};

pub struct GoResolver {
    module_path: Option<String>,
    dependencies: HashSet<String>,
    project_root: PathBuf,
}

impl Default for GoResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl GoResolver {
    pub fn new() -> Self {
        Self {
            module_path: None,
            dependencies: HashSet::new(),
            project_root: PathBuf::new(),
        }
    }

    /// Stdlib import paths never carry a domain in their first segment.
    fn is_stdlib(spec: &str) -> bool {
        spec.split('/')
            .next()
            .is_some_and(|root| !root.contains('.'))
    }

    /// A Go package resolves to a directory that actually holds sources.
    fn package_dir(candidate: PathBuf) -> Option<PathBuf> {
        if !candidate.is_dir() {
            return None;
        }
        let has_sources = std::fs::read_dir(&candidate)
            .ok()?
            .flatten()
            .any(|entry| entry.path().extension().is_some_and(|ext| ext == "go"));
        has_sources.then_some(candidate)
    }
}

impl ImportResolver for GoResolver {
    fn language(&self) -> &'static str {
        "go"
    }

    fn load_config(&mut self, project_root: &Path) -> anyhow::Result<()> {
        self.project_root = project_root.to_path_buf();
        let manifest = project_root.join("go.mod");
        if !manifest.is_file() {
            return Ok(());
        }
        let text = std::fs::read_to_string(&manifest)
            .with_context(|| format!("reading {}", manifest.display()))?;

        for line in text.lines() {
            let line = line.trim();
            if let Some(module) = line.strip_prefix("module ") {
                self.module_path = Some(module.trim().to_string());
                continue;
            }
            // Requires appear either inline (`require x v1`) or inside a
            // parenthesized block as `x v1` lines.
            let candidate = line.strip_prefix("require ").unwrap_or(line);
            let mut parts = candidate.split_whitespace();
            if let (Some(path), Some(version)) = (parts.next(), parts.next()) {
                if path.contains('.') && path.contains('/') && version.starts_with('v') {
                    self.dependencies.insert(path.to_string());
                }
            }
        }
        Ok(())
    }

    fn declared_dependencies(&self) -> &HashSet<String> {
        &self.dependencies
    }

    fn classify(&self, spec: &str) -> ImportClass {
        if spec.starts_with("./") || spec.starts_with("../") {
            return ImportClass::Relative;
        }
        if let Some(module) = &self.module_path {
            if spec == module || spec.starts_with(&format!("{module}/")) {
                return ImportClass::Absolute;
            }
        }
        if Self::is_stdlib(spec) {
            return ImportClass::Builtin;
        }
        if self
            .dependencies
            .iter()
            .any(|dep| spec == dep || spec.starts_with(&format!("{dep}/")))
        {
            return ImportClass::Package;
        }
        ImportClass::Unknown
    }

    fn resolve(&self, spec: &str, current_file: &Path) -> Option<PathBuf> {
        if let Some(relative) = spec.strip_prefix("./") {
            return Self::package_dir(current_file.parent()?.join(relative));
        }
        if spec.starts_with("../") {
            return Self::package_dir(current_file.parent()?.join(spec));
        }
        let module = self.module_path.as_deref()?;
        if spec == module {
            return Self::package_dir(self.project_root.clone());
        }
        let rest = spec.strip_prefix(&format!("{module}/"))?;
        Self::package_dir(self.project_root.join(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("go.mod"),
            r#"module github.com/acme/widgets

go 1.22

require (
    github.com/rs/zerolog v1.33.0
    golang.org/x/sync v0.8.0
)
"#,
        )
        .unwrap();
        let shapes = dir.path().join("internal/shapes");
        std::fs::create_dir_all(&shapes).unwrap();
        std::fs::write(shapes.join("circle.go"), "package shapes\n").unwrap();
        dir
    }

    #[test]
    fn classifies_module_stdlib_and_requires() {
        let dir = project();
        let mut resolver = GoResolver::new();
        resolver.load_config(dir.path()).unwrap();

        assert_eq!(
            resolver.classify("github.com/acme/widgets/internal/shapes"),
            ImportClass::Absolute
        );
        assert_eq!(resolver.classify("net/http"), ImportClass::Builtin);
        assert_eq!(resolver.classify("fmt"), ImportClass::Builtin);
        assert_eq!(resolver.classify("github.com/rs/zerolog"), ImportClass::Package);
        assert_eq!(resolver.classify("github.com/rs/zerolog/log"), ImportClass::Package);
        assert_eq!(resolver.classify("github.com/unknown/pkg"), ImportClass::Unknown);
    }

    #[test]
    fn resolves_module_paths_to_package_dirs() {
        let dir = project();
        let mut resolver = GoResolver::new();
        resolver.load_config(dir.path()).unwrap();
        let current = dir.path().join("main.go");

        let shapes = resolver
            .resolve("github.com/acme/widgets/internal/shapes", &current)
            .unwrap();
        assert!(shapes.ends_with("internal/shapes"));

        // Directories without Go sources never resolve.
        assert!(resolver
            .resolve("github.com/acme/widgets/internal", &current)
            .is_none());
    }
}

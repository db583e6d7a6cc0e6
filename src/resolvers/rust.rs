//! Rust import resolver: Cargo.toml dependencies, `crate`/`self`/`super`
//! paths, module files and `mod.rs` directory roots.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{walk_segments, ImportClass, ImportResolver};

const BUILTIN_CRATES: &[&str] = &["std", "core", "alloc", "proc_macro", "test"];

pub struct RustResolver {
    package_name: Option<String>,
    dependencies: HashSet<String>,
    project_root: PathBuf,
}

impl Default for RustResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RustResolver {
    pub fn new() -> Self {
        Self {
            package_name: None,
            dependencies: HashSet::new(),
            project_root: PathBuf::new(),
        }
    }

    fn root_segment(spec: &str) -> &str {
        spec.split("::").next().unwrap_or(spec)
    }
}

impl ImportResolver for RustResolver {
    fn language(&self) -> &'static str {
        "rust"
    }

    /// Line-oriented Cargo.toml scan: the package name plus every key in
    /// the dependency tables. A full TOML parse buys nothing here since
    /// only table membership matters.
    fn load_config(&mut self, project_root: &Path) -> anyhow::Result<()> {
        self.project_root = project_root.to_path_buf();
        let manifest = project_root.join("Cargo.toml");
        if !manifest.is_file() {
            return Ok(());
        }
        let text = std::fs::read_to_string(&manifest)
            .with_context(|| format!("reading {}", manifest.display()))?;

        let mut section = String::new();
        for line in text.lines() {
            let line = line.trim();
            if line.starts_with('[') {
                section = line.trim_matches(['[', ']']).to_string();
                continue;
            }
            let Some((key, _)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().trim_matches('"').to_string();
            match section.as_str() {
                "package" if key == "name" => {
                    let value = line.split_once('=').map(|(_, v)| v).unwrap_or("");
                    self.package_name = Some(value.trim().trim_matches('"').to_string());
                }
                "dependencies" | "dev-dependencies" | "build-dependencies"
                | "workspace.dependencies" => {
                    // Crate names use hyphens in manifests, underscores in code.
                    self.dependencies.insert(key.replace('-', "_"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn declared_dependencies(&self) -> &HashSet<String> {
        &self.dependencies
    }

    fn classify(&self, spec: &str) -> ImportClass {
        let root = Self::root_segment(spec);
        match root {
            "crate" => ImportClass::Absolute,
            "self" | "super" => ImportClass::Relative,
            _ if BUILTIN_CRATES.contains(&root) => ImportClass::Builtin,
            _ if self.package_name.as_deref() == Some(root) => ImportClass::Absolute,
            _ if self.dependencies.contains(root) => ImportClass::Package,
            _ => ImportClass::Unknown,
        }
    }

    fn resolve(&self, spec: &str, current_file: &Path) -> Option<PathBuf> {
        let segments: Vec<&str> = spec.split("::").collect();
        let (base, rest): (PathBuf, &[&str]) = match segments.first()? {
            &"crate" => (self.project_root.join("src"), &segments[1..]),
            &"self" => (current_file.parent()?.to_path_buf(), &segments[1..]),
            &"super" => {
                let mut dir = current_file.parent()?.to_path_buf();
                let mut idx = 0;
                while segments.get(idx) == Some(&"super") {
                    dir = dir.parent()?.to_path_buf();
                    idx += 1;
                }
                (dir, &segments[idx..])
            }
            root if self.package_name.as_deref() == Some(*root) => {
                (self.project_root.join("src"), &segments[1..])
            }
            _ => return None,
        };

        if rest.is_empty() {
            let lib = base.join("lib.rs");
            return lib.is_file().then_some(lib);
        }
        walk_segments(&base, rest, &["rs"], &["mod.rs"]).or_else(|| {
            // The trailing segment is usually an item, not a module file.
            if rest.len() > 1 {
                walk_segments(&base, &rest[..rest.len() - 1], &["rs"], &["mod.rs"])
            } else {
                let lib = base.join("lib.rs");
                lib.is_file().then_some(lib)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            r#"
[package]
name = "widgets"
version = "0.1.0"

[dependencies]
serde = { version = "1.0", features = ["derive"] }
tokio-util = "0.7"

[dev-dependencies]
tempfile = "3"
"#,
        )
        .unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("models")).unwrap();
        std::fs::write(src.join("lib.rs"), "").unwrap();
        std::fs::write(src.join("models/mod.rs"), "").unwrap();
        std::fs::write(src.join("models/shape.rs"), "").unwrap();
        dir
    }

    #[test]
    fn classifies_roots() {
        let dir = project();
        let mut resolver = RustResolver::new();
        resolver.load_config(dir.path()).unwrap();

        assert_eq!(resolver.classify("crate::models::Shape"), ImportClass::Absolute);
        assert_eq!(resolver.classify("super::helpers"), ImportClass::Relative);
        assert_eq!(resolver.classify("std::collections::HashMap"), ImportClass::Builtin);
        assert_eq!(resolver.classify("serde::Serialize"), ImportClass::Package);
        // Hyphenated manifest names match their in-code form.
        assert_eq!(resolver.classify("tokio_util::codec"), ImportClass::Package);
        assert_eq!(resolver.classify("leftpad::pad"), ImportClass::Unknown);
        assert_eq!(resolver.classify("widgets::models"), ImportClass::Absolute);
    }

    #[test]
    fn resolves_crate_paths_to_module_files() {
        let dir = project();
        let mut resolver = RustResolver::new();
        resolver.load_config(dir.path()).unwrap();
        let current = dir.path().join("src/lib.rs");

        let shape = resolver.resolve("crate::models::shape", &current).unwrap();
        assert!(shape.ends_with("models/shape.rs"));

        // Item segment falls back to the containing module.
        let item = resolver.resolve("crate::models::shape::Shape", &current).unwrap();
        assert!(item.ends_with("models/shape.rs"));

        let models = resolver.resolve("crate::models", &current).unwrap();
        assert!(models.ends_with("models/mod.rs"));

        assert!(resolver.resolve("crate::missing::thing", &current).is_none());
    }

    #[test]
    fn missing_manifest_degrades_to_empty_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = RustResolver::new();
        resolver.load_config(dir.path()).unwrap();
        assert!(resolver.declared_dependencies().is_empty());
        assert_eq!(resolver.classify("serde::Serialize"), ImportClass::Unknown);
    }
}

//! TypeScript import resolver: package.json dependencies, node builtins,
//! relative specifiers, `@/` source aliases and `index.ts` directory roots.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use once_cell::sync::Lazy;

use super::{walk_segments, ImportClass, ImportResolver};

static NODE_BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "assert", "buffer", "child_process", "cluster", "crypto", "dns", "events", "fs", "http",
        "http2", "https", "net", "os", "path", "perf_hooks", "process", "querystring",
        "readline", "stream", "string_decoder", "timers", "tls", "url", "util", "v8", "vm",
        "worker_threads", "zlib",
    ]
    .into_iter()
    .collect()
});

const FILE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js"];
const MODULE_ROOTS: &[&str] = &["index.ts", "index.tsx", "index.js"];

#[derive(serde::Deserialize, Default)]
struct PackageManifest {
    #[serde(default)]
    dependencies: HashMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: HashMap<String, serde_json::Value>,
}

pub struct TypeScriptResolver {
    dependencies: HashSet<String>,
    project_root: PathBuf,
}

impl Default for TypeScriptResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeScriptResolver {
    pub fn new() -> Self {
        Self {
            dependencies: HashSet::new(),
            project_root: PathBuf::new(),
        }
    }

    fn is_node_builtin(spec: &str) -> bool {
        spec.strip_prefix("node:")
            .map(|_| true)
            .unwrap_or_else(|| NODE_BUILTINS.contains(spec))
    }

    /// Scoped packages keep two segments (`@scope/name`), others one.
    fn package_root(spec: &str) -> String {
        let mut segments = spec.split('/');
        match segments.next() {
            Some(scope) if scope.starts_with('@') => match segments.next() {
                Some(name) => format!("{scope}/{name}"),
                None => scope.to_string(),
            },
            Some(root) => root.to_string(),
            None => spec.to_string(),
        }
    }
}

impl ImportResolver for TypeScriptResolver {
    fn language(&self) -> &'static str {
        "typescript"
    }

    fn load_config(&mut self, project_root: &Path) -> anyhow::Result<()> {
        self.project_root = project_root.to_path_buf();
        let manifest_path = project_root.join("package.json");
        if !manifest_path.is_file() {
            return Ok(());
        }
        let text = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("reading {}", manifest_path.display()))?;
        let manifest: PackageManifest = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", manifest_path.display()))?;
        self.dependencies
            .extend(manifest.dependencies.into_keys());
        self.dependencies
            .extend(manifest.dev_dependencies.into_keys());
        Ok(())
    }

    fn declared_dependencies(&self) -> &HashSet<String> {
        &self.dependencies
    }

    fn classify(&self, spec: &str) -> ImportClass {
        if spec.starts_with("./") || spec.starts_with("../") || spec == "." || spec == ".." {
            return ImportClass::Relative;
        }
        if spec.starts_with("@/") {
            return ImportClass::Alias;
        }
        if spec.starts_with('/') {
            return ImportClass::Absolute;
        }
        if Self::is_node_builtin(spec) {
            return ImportClass::Builtin;
        }
        if self.dependencies.contains(&Self::package_root(spec)) {
            return ImportClass::Package;
        }
        ImportClass::Unknown
    }

    fn resolve(&self, spec: &str, current_file: &Path) -> Option<PathBuf> {
        let (base, rest) = if let Some(aliased) = spec.strip_prefix("@/") {
            (self.project_root.join("src"), aliased.to_string())
        } else if spec.starts_with("./") || spec.starts_with("../") {
            (current_file.parent()?.to_path_buf(), spec.to_string())
        } else if let Some(rooted) = spec.strip_prefix('/') {
            (self.project_root.clone(), rooted.to_string())
        } else {
            return None;
        };

        let segments: Vec<&str> = rest
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        // `..` segments fold into the base before the walk.
        let mut dir = base;
        let mut start = 0;
        for segment in &segments {
            if *segment == ".." {
                dir = dir.parent()?.to_path_buf();
                start += 1;
            } else {
                break;
            }
        }
        let segments = &segments[start..];
        if segments.is_empty() {
            for root in MODULE_ROOTS {
                let candidate = dir.join(root);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
            return None;
        }
        // An extension given in the specifier is tried verbatim first.
        let verbatim = dir.join(segments.join("/"));
        if verbatim.is_file() {
            return Some(verbatim);
        }
        walk_segments(&dir, segments, FILE_EXTENSIONS, MODULE_ROOTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{
  "name": "widgets",
  "dependencies": { "react": "^18.0.0", "@tanstack/react-query": "^5.0.0" },
  "devDependencies": { "typescript": "^5.4.0" }
}"#,
        )
        .unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("shapes")).unwrap();
        std::fs::write(src.join("shapes/circle.ts"), "").unwrap();
        std::fs::write(src.join("shapes/index.ts"), "").unwrap();
        std::fs::write(src.join("app.tsx"), "").unwrap();
        dir
    }

    #[test]
    fn classifies_specifier_shapes() {
        let dir = project();
        let mut resolver = TypeScriptResolver::new();
        resolver.load_config(dir.path()).unwrap();

        assert_eq!(resolver.classify("./circle"), ImportClass::Relative);
        assert_eq!(resolver.classify("@/shapes/circle"), ImportClass::Alias);
        assert_eq!(resolver.classify("node:fs"), ImportClass::Builtin);
        assert_eq!(resolver.classify("path"), ImportClass::Builtin);
        assert_eq!(resolver.classify("react"), ImportClass::Package);
        assert_eq!(
            resolver.classify("@tanstack/react-query/devtools"),
            ImportClass::Package
        );
        assert_eq!(resolver.classify("left-pad"), ImportClass::Unknown);
    }

    #[test]
    fn resolves_relative_alias_and_index_forms() {
        let dir = project();
        let mut resolver = TypeScriptResolver::new();
        resolver.load_config(dir.path()).unwrap();
        let current = dir.path().join("src/app.tsx");

        let circle = resolver.resolve("./shapes/circle", &current).unwrap();
        assert!(circle.ends_with("shapes/circle.ts"));

        let index = resolver.resolve("./shapes", &current).unwrap();
        assert!(index.ends_with("shapes/index.ts"));

        let aliased = resolver.resolve("@/shapes/circle", &current).unwrap();
        assert!(aliased.ends_with("shapes/circle.ts"));

        let from_nested = dir.path().join("src/shapes/circle.ts");
        let up = resolver.resolve("../app.tsx", &from_nested).unwrap();
        assert!(up.ends_with("src/app.tsx"));

        assert!(resolver.resolve("./missing", &current).is_none());
    }
}

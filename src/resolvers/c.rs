//! C import resolver: quoted includes against the including file and the
//! project include directories, angle includes as system headers.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

use super::{ImportClass, ImportResolver};

static SYSTEM_HEADERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "assert.h", "complex.h", "ctype.h", "errno.h", "fenv.h", "float.h", "inttypes.h",
        "limits.h", "locale.h", "math.h", "setjmp.h", "signal.h", "stdalign.h", "stdarg.h",
        "stdatomic.h", "stdbool.h", "stddef.h", "stdint.h", "stdio.h", "stdlib.h", "string.h",
        "threads.h", "time.h", "uchar.h", "wchar.h", "wctype.h", "unistd.h", "fcntl.h",
        "pthread.h", "sys/types.h", "sys/stat.h",
    ]
    .into_iter()
    .collect()
});

const INCLUDE_DIRS: &[&str] = &["include", "src"];

pub struct CResolver {
    dependencies: HashSet<String>,
    project_root: PathBuf,
}

impl Default for CResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CResolver {
    pub fn new() -> Self {
        Self {
            dependencies: HashSet::new(),
            project_root: PathBuf::new(),
        }
    }
}

impl ImportResolver for CResolver {
    fn language(&self) -> &'static str {
        "c"
    }

    /// C has no manifest; the dependency set stays empty and headers are
    /// judged purely by name and location.
    fn load_config(&mut self, project_root: &Path) -> anyhow::Result<()> {
        self.project_root = project_root.to_path_buf();
        Ok(())
    }

    fn declared_dependencies(&self) -> &HashSet<String> {
        &self.dependencies
    }

    fn classify(&self, spec: &str) -> ImportClass {
        if SYSTEM_HEADERS.contains(spec) {
            return ImportClass::Builtin;
        }
        if spec.starts_with("./") || spec.starts_with("../") {
            return ImportClass::Relative;
        }
        // A header that exists in the project tree is a local include;
        // headers we cannot place are assumed to come from outside.
        if self.resolve_in_project(spec).is_some() {
            return ImportClass::Relative;
        }
        ImportClass::Unknown
    }

    fn resolve(&self, spec: &str, current_file: &Path) -> Option<PathBuf> {
        let beside = current_file.parent()?.join(spec);
        if beside.is_file() {
            return Some(beside);
        }
        self.resolve_in_project(spec)
    }
}

impl CResolver {
    fn resolve_in_project(&self, spec: &str) -> Option<PathBuf> {
        for dir in INCLUDE_DIRS {
            let candidate = self.project_root.join(dir).join(spec);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        let at_root = self.project_root.join(spec);
        at_root.is_file().then_some(at_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let include = dir.path().join("include");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&include).unwrap();
        std::fs::write(src.join("parser.h"), "").unwrap();
        std::fs::write(src.join("main.c"), "").unwrap();
        std::fs::write(include.join("api.h"), "").unwrap();
        dir
    }

    #[test]
    fn classifies_system_and_project_headers() {
        let dir = project();
        let mut resolver = CResolver::new();
        resolver.load_config(dir.path()).unwrap();

        assert_eq!(resolver.classify("stdio.h"), ImportClass::Builtin);
        assert_eq!(resolver.classify("parser.h"), ImportClass::Relative);
        assert_eq!(resolver.classify("api.h"), ImportClass::Relative);
        assert_eq!(resolver.classify("openssl/ssl.h"), ImportClass::Unknown);
    }

    #[test]
    fn resolves_beside_the_including_file_first() {
        let dir = project();
        let mut resolver = CResolver::new();
        resolver.load_config(dir.path()).unwrap();
        let current = dir.path().join("src/main.c");

        let parser = resolver.resolve("parser.h", &current).unwrap();
        assert!(parser.ends_with("src/parser.h"));

        let api = resolver.resolve("api.h", &current).unwrap();
        assert!(api.ends_with("include/api.h"));

        assert!(resolver.resolve("ghost.h", &current).is_none());
    }
}

//! Language Registry - shared tree-sitter language configuration
//!
//! The registry is an explicit value constructed once at startup and passed by
//! reference to every component that needs grammar lookup. Loaded grammars are
//! memoized (one `tree_sitter::Language` per language) behind a mutex so
//! concurrent per-file pipelines can share a single registry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::error::ScopegraphError;

/// Registry of installed tree-sitter grammars.
///
/// # Supported Languages (5 total)
///
/// **Systems**: Rust, C, Go
/// **Backend**: Python
/// **Web**: TypeScript (plus the `tsx` dialect)
pub struct LanguageRegistry {
    loaders: HashMap<&'static str, fn() -> tree_sitter::Language>,
    loaded: Mutex<HashMap<&'static str, tree_sitter::Language>>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LanguageRegistry {
    /// Empty registry; callers register grammars explicitly.
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Registry with every bundled grammar installed.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("rust", || tree_sitter_rust::LANGUAGE.into());
        registry.register("python", || tree_sitter_python::LANGUAGE.into());
        registry.register("typescript", || {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        });
        registry.register("tsx", || tree_sitter_typescript::LANGUAGE_TSX.into());
        registry.register("go", || tree_sitter_go::LANGUAGE.into());
        registry.register("c", || tree_sitter_c::LANGUAGE.into());
        registry
    }

    /// Install a grammar loader under a language name.
    pub fn register(&mut self, language: &'static str, loader: fn() -> tree_sitter::Language) {
        self.loaders.insert(language, loader);
    }

    /// Eagerly load every registered grammar.
    pub fn initialize_all(&self) -> Result<(), ScopegraphError> {
        for language in self.loaders.keys() {
            self.get(language)?;
        }
        Ok(())
    }

    /// Drop all memoized grammars; loaders stay registered.
    pub fn dispose(&self) {
        self.loaded.lock().expect("registry lock poisoned").clear();
    }

    /// Look up (or load and memoize) the grammar for a language name.
    pub fn get(&self, language: &str) -> Result<tree_sitter::Language, ScopegraphError> {
        let (key, loader) = self
            .loaders
            .get_key_value(language)
            .ok_or_else(|| ScopegraphError::UnsupportedLanguage(language.to_string()))?;

        let mut loaded = self.loaded.lock().expect("registry lock poisoned");
        if let Some(lang) = loaded.get(language) {
            return Ok(lang.clone());
        }
        let lang = loader();
        loaded.insert(key, lang.clone());
        Ok(lang)
    }

    /// Registered language names, sorted for deterministic output.
    pub fn supported(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.loaders.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Detect the language for a file path from its extension.
    pub fn detect_from_path(&self, file_path: &str) -> Result<&'static str, ScopegraphError> {
        let extension = Path::new(file_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let language = detect_language_from_extension(extension)
            .ok_or_else(|| ScopegraphError::UnsupportedExtension(extension.to_string()))?;

        if self.loaders.contains_key(language) {
            Ok(language)
        } else {
            Err(ScopegraphError::UnsupportedLanguage(language.to_string()))
        }
    }
}

/// Map a file extension to a language name accepted by the registry.
pub fn detect_language_from_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "rs" => Some("rust"),
        "py" | "pyi" => Some("python"),
        "ts" | "mts" | "cts" => Some("typescript"),
        "tsx" => Some("tsx"),
        "go" => Some("go"),
        "c" | "h" => Some("c"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_serves_all_default_grammars() {
        let registry = LanguageRegistry::with_defaults();
        for language in registry.supported() {
            assert!(
                registry.get(language).is_ok(),
                "grammar for '{}' should load",
                language
            );
        }
    }

    #[test]
    fn registry_rejects_unknown_language() {
        let registry = LanguageRegistry::with_defaults();
        let err = registry.get("cobol").unwrap_err();
        assert!(matches!(err, ScopegraphError::UnsupportedLanguage(_)));
    }

    #[test]
    fn detects_language_from_path() {
        let registry = LanguageRegistry::with_defaults();
        assert_eq!(registry.detect_from_path("src/main.rs").unwrap(), "rust");
        assert_eq!(registry.detect_from_path("app/views.py").unwrap(), "python");
        assert_eq!(registry.detect_from_path("ui/App.tsx").unwrap(), "tsx");
        assert!(registry.detect_from_path("notes.txt").is_err());
    }

    #[test]
    fn dispose_keeps_loaders() {
        let registry = LanguageRegistry::with_defaults();
        registry.initialize_all().unwrap();
        registry.dispose();
        assert!(registry.get("go").is_ok());
    }
}

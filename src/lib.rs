//! scopegraph - scope extraction and relationship resolution over
//! tree-sitter syntax trees.
//!
//! The crate runs in two stages. The extraction engine parses source files
//! for five languages (Rust, Python, TypeScript/TSX, Go, C) and produces a
//! flat per-file list of scopes: modules, types, functions, methods, enums
//! and variables, each with signature, members, modifiers, references and
//! a content-addressed identity. The relationship resolution engine then
//! classifies every identifier reference against imports and project
//! scopes and emits a typed graph (consumes, inherits-from, implements,
//! contains, decorated-by) together with a ledger of references it could
//! not place.
//!
//! ```no_run
//! use std::path::Path;
//! use scopegraph::{ExtractorManager, RelationshipResolver};
//!
//! let manager = ExtractorManager::new();
//! let files = manager.analyze_project(Path::new("."))?;
//! let graph = RelationshipResolver::new().resolve(&files, Path::new("."));
//! println!("{} relationships", graph.stats.total_relationships);
//! # Ok::<(), scopegraph::ScopegraphError>(())
//! ```

pub mod error;
pub mod extractors;
pub mod graph;
pub mod language;
pub mod resolvers;

pub use error::ScopegraphError;
pub use extractors::base::{
    IdentifierReference, ImportKind, ImportReference, Modifier, ReferenceKind, ScopeFileAnalysis,
    ScopeInfo, ScopeType,
};
pub use extractors::ExtractorManager;
pub use graph::{
    RelationshipResolver, RelationshipType, ResolutionResult, ResolutionStats,
    ResolvedRelationship, UnresolvedReason, UnresolvedReference,
};
pub use language::LanguageRegistry;
pub use resolvers::{ImportClass, ImportResolver, ResolvedImport};

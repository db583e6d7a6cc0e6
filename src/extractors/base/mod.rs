// Base extractor - shared types and machinery for all language extractors
//
// - types.rs: the data model (ScopeInfo, references, imports, file analysis)
// - extractor.rs: BaseExtractor (ids, doc comments, scope creation, assembly)
// - references.rs: generic identifier-reference collection walk
// - tree_methods.rs: tree navigation helpers

pub mod extractor;
pub mod references;
pub mod tree_methods;
pub mod types;

pub use extractor::BaseExtractor;
pub use types::{
    EnumMember, GenericParameter, HeritageClause, HeritageKind, IdentifierReference, ImportKind,
    ImportReference, Member, Modifier, Parameter, ParentContext, ReferenceKind, ScopeFileAnalysis,
    ScopeInfo, ScopeOptions, ScopeType, TargetScope,
};

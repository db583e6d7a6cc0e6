//! Relationship graph data model: typed edges between scopes, the
//! unresolved-reference ledger and per-run statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extractors::base::ScopeType;

/// Directed relationship kinds. Forward kinds are emitted from the
/// referencing scope; every kind has a total inverse so mirrored edges
/// can be generated mechanically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Consumes,
    ConsumedBy,
    InheritsFrom,
    InheritedBy,
    Implements,
    ImplementedBy,
    Contains,
    ContainedIn,
    DecoratedBy,
    Decorates,
}

impl RelationshipType {
    pub fn inverse(self) -> RelationshipType {
        match self {
            RelationshipType::Consumes => RelationshipType::ConsumedBy,
            RelationshipType::ConsumedBy => RelationshipType::Consumes,
            RelationshipType::InheritsFrom => RelationshipType::InheritedBy,
            RelationshipType::InheritedBy => RelationshipType::InheritsFrom,
            RelationshipType::Implements => RelationshipType::ImplementedBy,
            RelationshipType::ImplementedBy => RelationshipType::Implements,
            RelationshipType::Contains => RelationshipType::ContainedIn,
            RelationshipType::ContainedIn => RelationshipType::Contains,
            RelationshipType::DecoratedBy => RelationshipType::Decorates,
            RelationshipType::Decorates => RelationshipType::DecoratedBy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipType::Consumes => "consumes",
            RelationshipType::ConsumedBy => "consumed_by",
            RelationshipType::InheritsFrom => "inherits_from",
            RelationshipType::InheritedBy => "inherited_by",
            RelationshipType::Implements => "implements",
            RelationshipType::ImplementedBy => "implemented_by",
            RelationshipType::Contains => "contains",
            RelationshipType::ContainedIn => "contained_in",
            RelationshipType::DecoratedBy => "decorated_by",
            RelationshipType::Decorates => "decorates",
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved edge. The target side is optional: consumption of an
/// external package resolves the import but has no scope to point at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRelationship {
    pub relationship_type: RelationshipType,
    pub from_name: String,
    pub from_file: String,
    pub from_type: ScopeType,
    pub to_name: String,
    pub to_file: Option<String>,
    pub to_type: Option<ScopeType>,
    /// Free-form edge annotations (import source, line numbers).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Why a reference could not be resolved to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedReason {
    /// Qualified reference whose qualifier matched no import binding
    NoImportMatch,
    /// Bare reference that matched neither imports nor any known scope
    NoLocalScopeMatch,
}

/// Ledger entry for a reference the resolver gave up on. These are data,
/// not errors; partial graphs are the expected output on real code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedReference {
    pub from_scope: String,
    pub from_file: String,
    pub identifier: String,
    pub line: u32,
    pub reason: UnresolvedReason,
}

/// Counters for one resolution run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub total_files: usize,
    pub total_scopes: usize,
    pub total_relationships: usize,
    pub relationships_by_type: BTreeMap<String, usize>,
    pub unresolved_count: usize,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_is_an_involution() {
        let all = [
            RelationshipType::Consumes,
            RelationshipType::ConsumedBy,
            RelationshipType::InheritsFrom,
            RelationshipType::InheritedBy,
            RelationshipType::Implements,
            RelationshipType::ImplementedBy,
            RelationshipType::Contains,
            RelationshipType::ContainedIn,
            RelationshipType::DecoratedBy,
            RelationshipType::Decorates,
        ];
        for kind in all {
            assert_eq!(kind.inverse().inverse(), kind);
            assert_ne!(kind.inverse(), kind);
        }
    }

    #[test]
    fn reasons_serialize_as_kebab_case() {
        let json = serde_json::to_string(&UnresolvedReason::NoImportMatch).unwrap();
        assert_eq!(json, "\"no-import-match\"");
        let json = serde_json::to_string(&UnresolvedReason::NoLocalScopeMatch).unwrap();
        assert_eq!(json, "\"no-local-scope-match\"");
    }
}

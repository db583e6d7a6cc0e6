//! Relationship Resolution Engine.
//!
//! Two passes over a project's per-file analyses. Classification annotates
//! every identifier reference with what it points at (an import binding or
//! a scope somewhere in the project) without mutating the input; references
//! that resolve to builtins are dropped from the classified list. Emission
//! then turns classified references, heritage markers and the parent/child
//! structure into typed edges plus an unresolved ledger.
//!
//! Candidate lookups iterate files in sorted order and take the first
//! match, so identical inputs always produce identical graphs.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::extractors::base::{
    HeritageKind, ReferenceKind, ScopeFileAnalysis, ScopeInfo, ScopeType, TargetScope,
};
use crate::resolvers::{resolver_for, ImportClass};

use super::types::{
    RelationshipType, ResolutionStats, ResolvedRelationship, UnresolvedReason,
    UnresolvedReference,
};

/// Everything one resolution run produces.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Input analyses with classified references; the originals are untouched.
    pub files: BTreeMap<String, ScopeFileAnalysis>,
    pub relationships: Vec<ResolvedRelationship>,
    pub unresolved: Vec<UnresolvedReference>,
    pub stats: ResolutionStats,
}

pub struct RelationshipResolver {
    generate_inverse: bool,
}

impl Default for RelationshipResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipResolver {
    pub fn new() -> Self {
        Self {
            generate_inverse: true,
        }
    }

    /// Emit only forward edges.
    pub fn without_inverse(mut self) -> Self {
        self.generate_inverse = false;
        self
    }

    /// Run both passes over a project snapshot.
    pub fn resolve(
        &self,
        files: &BTreeMap<String, ScopeFileAnalysis>,
        project_root: &Path,
    ) -> ResolutionResult {
        let started = Instant::now();
        let classified = self.classify(files, project_root);
        let (relationships, unresolved) = self.emit(&classified);

        let mut relationships_by_type: BTreeMap<String, usize> = BTreeMap::new();
        for edge in &relationships {
            *relationships_by_type
                .entry(edge.relationship_type.as_str().to_string())
                .or_default() += 1;
        }
        let stats = ResolutionStats {
            total_files: classified.len(),
            total_scopes: classified.values().map(|f| f.scopes.len()).sum(),
            total_relationships: relationships.len(),
            relationships_by_type,
            unresolved_count: unresolved.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            files = stats.total_files,
            scopes = stats.total_scopes,
            relationships = stats.total_relationships,
            unresolved = stats.unresolved_count,
            "relationship resolution finished"
        );
        ResolutionResult {
            files: classified,
            relationships,
            unresolved,
            stats,
        }
    }

    /// Classification pass: returns a new map in which every reference
    /// carries its `ReferenceKind`, matched import source and target scope.
    pub fn classify(
        &self,
        files: &BTreeMap<String, ScopeFileAnalysis>,
        project_root: &Path,
    ) -> BTreeMap<String, ScopeFileAnalysis> {
        let global_index = build_global_index(files);

        let mut classified = BTreeMap::new();
        for (file_path, analysis) in files {
            let resolver = resolver_for(&analysis.language, project_root);

            // Import bindings visible in this file, by local name.
            let mut bindings: HashMap<&str, ImportBinding> = HashMap::new();
            for (index, import) in analysis.imports.iter().enumerate() {
                let class = resolver
                    .as_ref()
                    .map(|r| r.classify(&import.source))
                    .unwrap_or(if import.is_local {
                        ImportClass::Relative
                    } else {
                        ImportClass::Unknown
                    });
                let target_file = resolver.as_ref().and_then(|r| {
                    if !class.is_project_local() && !import.is_local {
                        return None;
                    }
                    let resolved = r.resolve(&import.source, Path::new(file_path))?;
                    find_file_key(files, &resolved)
                });
                bindings.insert(
                    import.local_name(),
                    ImportBinding {
                        index,
                        class,
                        target_file,
                    },
                );
            }

            let mut updated = analysis.clone();
            for scope in &mut updated.scopes {
                let own_name = scope.name.clone();
                let import_references = &mut scope.import_references;
                for reference in &mut scope.identifier_references {
                    let lookup = reference
                        .qualifier
                        .as_deref()
                        .map(root_of)
                        .unwrap_or(&reference.name);

                    if let Some(binding) = bindings.get(lookup) {
                        let import = &analysis.imports[binding.index];
                        if binding.class == ImportClass::Builtin {
                            reference.kind = ReferenceKind::Builtin;
                            reference.source = Some(import.source.clone());
                            continue;
                        }
                        reference.kind = ReferenceKind::Import;
                        reference.source = Some(import.source.clone());
                        reference.is_local_import =
                            Some(binding.class.is_project_local() || import.is_local);
                        reference.target_scope = binding
                            .target_file
                            .as_ref()
                            .and_then(|key| target_in_file(files, key, &reference.name))
                            .or_else(|| {
                                // The path walk failed but the symbol may
                                // still be known in-project. Package imports
                                // and member accesses stay untargeted.
                                if binding.class == ImportClass::Package
                                    || reference.qualifier.is_some()
                                {
                                    return None;
                                }
                                global_index.get(reference.name.as_str()).cloned()
                            });
                        if !import_references.contains(import) {
                            import_references.push(import.clone());
                        }
                        continue;
                    }

                    // Qualified names that match no binding cannot be
                    // resolved against scope names; the qualifier decides.
                    if reference.qualifier.is_some() {
                        continue;
                    }

                    if let Some(target) = global_index.get(reference.name.as_str()) {
                        if target.name != own_name || target.file_path != *file_path {
                            reference.kind = ReferenceKind::LocalScope;
                            reference.target_scope = Some(target.clone());
                        }
                    }
                }
                // Builtin usage is not part of the graph; those references
                // leave the classified list entirely.
                scope
                    .identifier_references
                    .retain(|r| r.kind != ReferenceKind::Builtin);
            }
            debug!(file = %file_path, "classified references");
            classified.insert(file_path.clone(), updated);
        }
        classified
    }

    /// Emission pass: classified references and structural nesting become
    /// typed edges; what stays unknown goes into the ledger.
    fn emit(
        &self,
        files: &BTreeMap<String, ScopeFileAnalysis>,
    ) -> (Vec<ResolvedRelationship>, Vec<UnresolvedReference>) {
        let mut relationships = Vec::new();
        let mut unresolved = Vec::new();
        let mut seen: BTreeSet<(String, String, RelationshipType, String, String)> =
            BTreeSet::new();

        for (file_path, analysis) in files {
            for scope in &analysis.scopes {
                self.emit_containment(file_path, analysis, scope, &mut relationships, &mut seen);

                for reference in &scope.identifier_references {
                    match reference.kind {
                        ReferenceKind::Builtin => continue,
                        ReferenceKind::Unknown => {
                            unresolved.push(UnresolvedReference {
                                from_scope: scope.name.clone(),
                                from_file: file_path.clone(),
                                identifier: match &reference.qualifier {
                                    Some(q) => format!("{}.{}", q, reference.name),
                                    None => reference.name.clone(),
                                },
                                line: reference.line,
                                reason: if reference.qualifier.is_some() {
                                    UnresolvedReason::NoImportMatch
                                } else {
                                    UnresolvedReason::NoLocalScopeMatch
                                },
                            });
                            continue;
                        }
                        ReferenceKind::Import | ReferenceKind::LocalScope => {}
                    }

                    let relationship_type = match reference.heritage {
                        Some(HeritageKind::Extends) => RelationshipType::InheritsFrom,
                        Some(HeritageKind::Implements) => RelationshipType::Implements,
                        Some(HeritageKind::Decorator) => RelationshipType::DecoratedBy,
                        None => RelationshipType::Consumes,
                    };

                    let (to_file, to_type) = match &reference.target_scope {
                        Some(target) => (
                            Some(target.file_path.clone()),
                            scope_type_of(files, target),
                        ),
                        None => (None, None),
                    };

                    let key = (
                        file_path.clone(),
                        scope.name.clone(),
                        relationship_type,
                        reference.name.clone(),
                        to_file.clone().unwrap_or_default(),
                    );
                    if !seen.insert(key) {
                        continue;
                    }

                    let mut properties = BTreeMap::new();
                    properties.insert("line".to_string(), reference.line.to_string());
                    if let Some(source) = &reference.source {
                        properties.insert("import_source".to_string(), source.clone());
                    }
                    let edge = ResolvedRelationship {
                        relationship_type,
                        from_name: scope.name.clone(),
                        from_file: file_path.clone(),
                        from_type: scope.scope_type,
                        to_name: reference.name.clone(),
                        to_file,
                        to_type,
                        properties,
                    };
                    if self.generate_inverse {
                        if let Some(inverse) = invert(&edge) {
                            relationships.push(inverse);
                        }
                    }
                    relationships.push(edge);
                }
            }
        }
        (relationships, unresolved)
    }

    fn emit_containment(
        &self,
        file_path: &str,
        analysis: &ScopeFileAnalysis,
        scope: &ScopeInfo,
        relationships: &mut Vec<ResolvedRelationship>,
        seen: &mut BTreeSet<(String, String, RelationshipType, String, String)>,
    ) {
        let Some(parent_name) = &scope.parent else {
            return;
        };
        let Some(parent) = analysis
            .scopes
            .iter()
            .find(|s| &s.name == parent_name && s.depth + 1 == scope.depth)
        else {
            return;
        };
        let key = (
            file_path.to_string(),
            parent.name.clone(),
            RelationshipType::Contains,
            scope.name.clone(),
            file_path.to_string(),
        );
        if !seen.insert(key) {
            return;
        }
        let edge = ResolvedRelationship {
            relationship_type: RelationshipType::Contains,
            from_name: parent.name.clone(),
            from_file: file_path.to_string(),
            from_type: parent.scope_type,
            to_name: scope.name.clone(),
            to_file: Some(file_path.to_string()),
            to_type: Some(scope.scope_type),
            properties: BTreeMap::new(),
        };
        if self.generate_inverse {
            if let Some(inverse) = invert(&edge) {
                relationships.push(inverse);
            }
        }
        relationships.push(edge);
    }
}

struct ImportBinding {
    /// Position in the file's import list.
    index: usize,
    class: ImportClass,
    /// Key into the analyses map, when the import resolves in-project.
    target_file: Option<String>,
}

/// First named scope per name across the sorted project. First candidate
/// wins; later files never displace an earlier binding.
fn build_global_index(files: &BTreeMap<String, ScopeFileAnalysis>) -> HashMap<String, TargetScope> {
    let mut index = HashMap::new();
    for (file_path, analysis) in files {
        for scope in &analysis.scopes {
            if scope.name.starts_with("Anonymous") {
                continue;
            }
            index
                .entry(scope.name.clone())
                .or_insert_with(|| TargetScope {
                    file_path: file_path.clone(),
                    name: scope.name.clone(),
                    start_line: scope.start_line,
                    end_line: scope.end_line,
                });
        }
    }
    index
}

fn root_of(qualifier: &str) -> &str {
    qualifier
        .split("::")
        .next()
        .and_then(|s| s.split('.').next())
        .unwrap_or(qualifier)
}

/// Maps a resolved filesystem path back onto an analyses-map key. Exact
/// match first; otherwise the key and path must agree on their suffix.
fn find_file_key(
    files: &BTreeMap<String, ScopeFileAnalysis>,
    resolved: &Path,
) -> Option<String> {
    let resolved_str = resolved.to_string_lossy();
    if files.contains_key(resolved_str.as_ref()) {
        return Some(resolved_str.to_string());
    }
    files
        .keys()
        .find(|key| key.ends_with(resolved_str.as_ref()) || resolved_str.ends_with(key.as_str()))
        .cloned()
}

fn target_in_file(
    files: &BTreeMap<String, ScopeFileAnalysis>,
    key: &str,
    name: &str,
) -> Option<TargetScope> {
    let analysis = files.get(key)?;
    let scope = analysis.scopes.iter().find(|s| s.name == name)?;
    Some(TargetScope {
        file_path: key.to_string(),
        name: scope.name.clone(),
        start_line: scope.start_line,
        end_line: scope.end_line,
    })
}

fn scope_type_of(
    files: &BTreeMap<String, ScopeFileAnalysis>,
    target: &TargetScope,
) -> Option<ScopeType> {
    files.get(&target.file_path)?.scopes.iter().find_map(|s| {
        (s.name == target.name && s.start_line == target.start_line).then_some(s.scope_type)
    })
}

/// Mirror of an edge, pointing from the target back at the source. Edges
/// without a resolved target have nothing to anchor the mirror on.
fn invert(edge: &ResolvedRelationship) -> Option<ResolvedRelationship> {
    let to_file = edge.to_file.clone()?;
    let to_type = edge.to_type?;
    Some(ResolvedRelationship {
        relationship_type: edge.relationship_type.inverse(),
        from_name: edge.to_name.clone(),
        from_file: to_file,
        from_type: to_type,
        to_name: edge.from_name.clone(),
        to_file: Some(edge.from_file.clone()),
        to_type: Some(edge.from_type),
        properties: edge.properties.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ExtractorManager;

    fn analyze(files: &[(&str, &str, &str)]) -> BTreeMap<String, ScopeFileAnalysis> {
        let manager = ExtractorManager::new();
        files
            .iter()
            .map(|(path, language, source)| {
                let analysis = manager
                    .analyze_source(path.to_string(), source.to_string(), language)
                    .unwrap();
                (path.to_string(), analysis)
            })
            .collect()
    }

    #[test]
    fn cross_file_inheritance_resolves_through_imports() {
        let dir = tempfile::tempdir().unwrap();
        let files = analyze(&[
            (
                "shapes.py",
                "python",
                "class Shape:\n    def area(self):\n        return 0\n",
            ),
            (
                "circle.py",
                "python",
                "from shapes import Shape\n\nclass Circle(Shape):\n    def area(self):\n        return 3\n",
            ),
        ]);
        let result = RelationshipResolver::new().resolve(&files, dir.path());

        let inherits = result
            .relationships
            .iter()
            .find(|r| {
                r.relationship_type == RelationshipType::InheritsFrom
                    && r.from_name == "Circle"
            })
            .expect("Circle inherits from Shape");
        assert_eq!(inherits.to_name, "Shape");
        assert_eq!(inherits.to_file.as_deref(), Some("shapes.py"));

        // Mirrored edge exists with the inverse type.
        assert!(result.relationships.iter().any(|r| {
            r.relationship_type == RelationshipType::InheritedBy
                && r.from_name == "Shape"
                && r.to_name == "Circle"
        }));
    }

    #[test]
    fn containment_follows_structural_nesting() {
        let dir = tempfile::tempdir().unwrap();
        let files = analyze(&[(
            "geometry.rs",
            "rust",
            "pub struct Grid;\n\nimpl Grid {\n    pub fn cell(&self) -> u32 { 0 }\n}\n",
        )]);
        let result = RelationshipResolver::new().resolve(&files, dir.path());

        assert!(result.relationships.iter().any(|r| {
            r.relationship_type == RelationshipType::Contains
                && r.from_name == "Grid"
                && r.to_name == "cell"
        }));
        assert!(result.relationships.iter().any(|r| {
            r.relationship_type == RelationshipType::ContainedIn
                && r.from_name == "cell"
                && r.to_name == "Grid"
        }));
    }

    #[test]
    fn unknown_references_land_in_the_ledger_with_reasons() {
        let dir = tempfile::tempdir().unwrap();
        let files = analyze(&[(
            "app.py",
            "python",
            "def handler():\n    mystery_call()\n    ghost.attribute()\n",
        )]);
        let result = RelationshipResolver::new().resolve(&files, dir.path());

        let bare = result
            .unresolved
            .iter()
            .find(|u| u.identifier == "mystery_call")
            .unwrap();
        assert_eq!(bare.reason, UnresolvedReason::NoLocalScopeMatch);

        let qualified = result
            .unresolved
            .iter()
            .find(|u| u.identifier.starts_with("ghost."))
            .unwrap();
        assert_eq!(qualified.reason, UnresolvedReason::NoImportMatch);

        assert_eq!(result.stats.unresolved_count, result.unresolved.len());
    }

    #[test]
    fn classification_never_mutates_the_input() {
        let dir = tempfile::tempdir().unwrap();
        let files = analyze(&[(
            "lib.rs",
            "rust",
            "pub fn alpha() {}\n\npub fn beta() { alpha(); }\n",
        )]);
        let resolver = RelationshipResolver::new();
        let classified = resolver.classify(&files, dir.path());

        let before = &files["lib.rs"].scopes;
        let beta = before.iter().find(|s| s.name == "beta").unwrap();
        assert!(beta
            .identifier_references
            .iter()
            .all(|r| r.kind == ReferenceKind::Unknown));

        let after = &classified["lib.rs"].scopes;
        let beta = after.iter().find(|s| s.name == "beta").unwrap();
        let alpha_ref = beta
            .identifier_references
            .iter()
            .find(|r| r.name == "alpha")
            .unwrap();
        assert_eq!(alpha_ref.kind, ReferenceKind::LocalScope);
        assert!(alpha_ref.target_scope.is_some());
    }

    #[test]
    fn stats_account_for_every_edge() {
        let dir = tempfile::tempdir().unwrap();
        let files = analyze(&[(
            "main.go",
            "go",
            "package main\n\ntype Logger struct{}\n\nfunc run(l Logger) {}\n",
        )]);
        let result = RelationshipResolver::new().resolve(&files, dir.path());

        let by_type_total: usize = result.stats.relationships_by_type.values().sum();
        assert_eq!(by_type_total, result.stats.total_relationships);
        assert_eq!(result.stats.total_files, 1);
        assert!(result.stats.total_scopes >= 3);
    }

    #[test]
    fn builtin_imports_drop_their_references() {
        let dir = tempfile::tempdir().unwrap();
        let files = analyze(&[(
            "config.py",
            "python",
            "import os\n\ndef read_env():\n    return os.environ\n",
        )]);
        let result = RelationshipResolver::new().resolve(&files, dir.path());

        let read_env = result.files["config.py"]
            .scopes
            .iter()
            .find(|s| s.name == "read_env")
            .unwrap();
        assert!(read_env
            .identifier_references
            .iter()
            .all(|r| r.kind != ReferenceKind::Builtin));
        assert!(!read_env
            .identifier_references
            .iter()
            .any(|r| r.qualifier.as_deref() == Some("os")));
        assert!(result
            .unresolved
            .iter()
            .all(|u| !u.identifier.starts_with("os.")));
    }

    #[test]
    fn same_file_definitions_do_not_displace_the_first_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let files = analyze(&[
            ("a_shapes.py", "python", "class Shape:\n    pass\n"),
            (
                "z_user.py",
                "python",
                "class Shape:\n    pass\n\ndef build():\n    return Shape()\n",
            ),
        ]);
        let result = RelationshipResolver::new().resolve(&files, dir.path());

        let consumes = result
            .relationships
            .iter()
            .find(|r| {
                r.relationship_type == RelationshipType::Consumes && r.from_name == "build"
            })
            .unwrap();
        assert_eq!(consumes.to_file.as_deref(), Some("a_shapes.py"));
    }

    #[test]
    fn duplicate_names_resolve_to_the_first_sorted_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let files = analyze(&[
            ("a_shapes.py", "python", "class Shape:\n    pass\n"),
            ("z_shapes.py", "python", "class Shape:\n    pass\n"),
            (
                "user.py",
                "python",
                "def build():\n    return Shape()\n",
            ),
        ]);
        let result = RelationshipResolver::new().resolve(&files, dir.path());

        let consumes = result
            .relationships
            .iter()
            .find(|r| {
                r.relationship_type == RelationshipType::Consumes && r.from_name == "build"
            })
            .unwrap();
        assert_eq!(consumes.to_file.as_deref(), Some("a_shapes.py"));
    }
}

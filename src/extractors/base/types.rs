// Base extractor types
//
// All data structures for scope extraction: scopes, parameters, heritage,
// identifier references, import references, and the per-file container.

use serde::{Deserialize, Serialize};

/// Kind of scope-worthy construct. Closed variant set; every extracted
/// `ScopeInfo` carries exactly one of these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    Module,
    Class,
    Struct,
    Trait,
    Interface,
    Function,
    Method,
    Enum,
    TypeAlias,
    Namespace,
    Variable,
    Constant,
    Lambda,
}

impl std::fmt::Display for ScopeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeType::Module => write!(f, "module"),
            ScopeType::Class => write!(f, "class"),
            ScopeType::Struct => write!(f, "struct"),
            ScopeType::Trait => write!(f, "trait"),
            ScopeType::Interface => write!(f, "interface"),
            ScopeType::Function => write!(f, "function"),
            ScopeType::Method => write!(f, "method"),
            ScopeType::Enum => write!(f, "enum"),
            ScopeType::TypeAlias => write!(f, "type_alias"),
            ScopeType::Namespace => write!(f, "namespace"),
            ScopeType::Variable => write!(f, "variable"),
            ScopeType::Constant => write!(f, "constant"),
            ScopeType::Lambda => write!(f, "lambda"),
        }
    }
}

/// Language-neutral modifier tags attached to a scope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Async,
    Static,
    Const,
    Abstract,
    Export,
    Unsafe,
    Readonly,
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modifier::Public => write!(f, "public"),
            Modifier::Private => write!(f, "private"),
            Modifier::Protected => write!(f, "protected"),
            Modifier::Async => write!(f, "async"),
            Modifier::Static => write!(f, "static"),
            Modifier::Const => write!(f, "const"),
            Modifier::Abstract => write!(f, "abstract"),
            Modifier::Export => write!(f, "export"),
            Modifier::Unsafe => write!(f, "unsafe"),
            Modifier::Readonly => write!(f, "readonly"),
        }
    }
}

/// One declared parameter of a function-like scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    /// Parameter name as written
    pub name: String,
    /// Declared type annotation, when the language has one
    pub declared_type: Option<String>,
    /// Optional parameter (default value or `?` marker)
    pub optional: bool,
    /// Rest/variadic parameter (`...args`, `*args`, `...`)
    pub rest: bool,
    /// Start line number (1-based)
    pub line: u32,
    /// Start column number (0-based)
    pub column: u32,
}

/// Generic/template type parameter: name plus optional bound and default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenericParameter {
    pub name: String,
    pub constraint: Option<String>,
    pub default: Option<String>,
}

/// How a heritage clause relates a scope to a target type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HeritageKind {
    Extends,
    Implements,
    Decorator,
}

/// An extends/implements edge declared on a scope, by target type name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeritageClause {
    pub kind: HeritageKind,
    pub target: String,
}

/// A field/property declared directly inside a class-like scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub name: String,
    pub declared_type: Option<String>,
    pub accessibility: Option<Modifier>,
    pub line: u32,
}

/// One variant/member of an enum-like scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<String>,
    pub line: u32,
}

/// Classification of an identifier reference. Starts `Unknown` at extraction
/// time and is refined by the relationship resolver's classification pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Unknown,
    Import,
    LocalScope,
    Builtin,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Unknown => write!(f, "unknown"),
            ReferenceKind::Import => write!(f, "import"),
            ReferenceKind::LocalScope => write!(f, "local_scope"),
            ReferenceKind::Builtin => write!(f, "builtin"),
        }
    }
}

/// Pointer to the scope a classified reference resolved to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetScope {
    pub file_path: String,
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// An occurrence of a name inside a scope's body that is not that scope's own
/// declaration, parameter, or receiver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentifierReference {
    /// Identifier text as written
    pub name: String,
    /// Qualifier for `a.b` / `a::b` forms (the `a` part)
    pub qualifier: Option<String>,
    /// Start line number (1-based)
    pub line: u32,
    /// Start column number (0-based)
    pub column: u32,
    /// The textual source line the reference appears on
    pub context_line: String,
    /// Classification; `Unknown` until the resolver's classification pass runs
    pub kind: ReferenceKind,
    /// Import source specifier, filled when classified as `Import`
    pub source: Option<String>,
    /// Whether the matched import resolves to a project file
    pub is_local_import: Option<bool>,
    /// Resolved target, filled when classified as `LocalScope`
    pub target_scope: Option<TargetScope>,
    /// Set on synthetic references injected for extends/implements/decorator
    /// targets; drives relationship-type selection during emission
    pub heritage: Option<HeritageKind>,
}

/// How an import binds its names locally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Default,
    Named,
    Namespace,
    SideEffect,
}

/// A resolved binding from a local name to an external or local module/symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportReference {
    /// Module/path specifier as written in the source
    pub source: String,
    /// Imported symbol name, or the module itself for namespace/default forms
    pub imported: String,
    /// Local rename, if any
    pub alias: Option<String>,
    pub kind: ImportKind,
    /// Resolves to a project file rather than an external package/stdlib
    pub is_local: bool,
}

impl ImportReference {
    /// The name this import is known by inside the file: alias when renamed,
    /// otherwise the imported name.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.imported)
    }
}

/// One semantic unit of code: module, type, function, method, enum, variable.
///
/// Scopes are produced as a flat per-file list; hierarchy is reconstructed
/// through `parent` names and `depth`, not ownership pointers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScopeInfo {
    /// Content-addressed identity: md5 of file path + span + content, so
    /// identical input always yields identical identity
    pub id: String,
    /// Declared name; anonymous constructs receive a synthesized placeholder
    pub name: String,
    pub scope_type: ScopeType,
    pub file_path: String,
    /// Start line number (1-based, inclusive)
    pub start_line: u32,
    /// End line number (1-based, inclusive)
    pub end_line: u32,
    /// Rendered textual form: name + parameters + return type
    pub signature: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub modifiers: Vec<Modifier>,
    pub generic_parameters: Vec<GenericParameter>,
    pub heritage_clauses: Vec<HeritageClause>,
    /// Raw body text
    pub content: String,
    /// De-indented copy of the body text
    pub dedented_content: String,
    /// Documentation comment preceding the construct
    pub doc_comment: Option<String>,
    /// Fields/properties declared directly inside
    pub members: Vec<Member>,
    pub enum_members: Vec<EnumMember>,
    /// Names of variables declared directly inside the body
    pub variables: Vec<String>,
    /// Every non-definition identifier use found inside the scope
    pub identifier_references: Vec<IdentifierReference>,
    /// Subset of file-level imports actually used inside this scope
    pub import_references: Vec<ImportReference>,
    /// Informally detected external package names
    pub dependencies: Vec<String>,
    /// Names this scope makes visible outward
    pub exports: Vec<String>,
    pub ast_valid: bool,
    pub ast_issues: Vec<String>,
    pub ast_notes: Vec<String>,
    /// Cyclomatic-style count: 1 + branching/loop/logical-operator nodes
    pub complexity: u32,
    pub lines_of_code: u32,
    /// Name of the enclosing scope; lookup back-reference, not ownership
    pub parent: Option<String>,
    pub depth: u32,
}

/// Per-file container produced by one extraction call.
///
/// `scopes` is ordered pre-order (parents before children) and flat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScopeFileAnalysis {
    pub file_path: String,
    pub language: String,
    pub scopes: Vec<ScopeInfo>,
    pub total_lines: u32,
    /// File-level imports in declaration order
    pub imports: Vec<ImportReference>,
    pub exports: Vec<String>,
    /// External package root names referenced by the file's imports
    pub dependencies: Vec<String>,
    pub ast_valid: bool,
    pub ast_issues: Vec<String>,
    /// blake3 hash of the file text, for change detection
    pub content_hash: String,
}

/// Enclosing-scope context threaded through the extraction walk.
#[derive(Debug, Clone)]
pub struct ParentContext {
    /// Name of the enclosing scope
    pub name: String,
    /// Whether the enclosing scope is class-like (methods vs. functions)
    pub is_type: bool,
    /// Depth of the enclosing scope itself
    pub depth: u32,
}

impl ParentContext {
    pub fn new(name: impl Into<String>, is_type: bool, depth: u32) -> Self {
        Self {
            name: name.into(),
            is_type,
            depth,
        }
    }

    /// Depth assigned to scopes nested directly under this one.
    pub fn child_depth(&self) -> u32 {
        self.depth + 1
    }
}

/// Depth for a scope created under an optional enclosing context.
pub fn depth_under(parent: Option<&ParentContext>) -> u32 {
    parent.map(|p| p.child_depth()).unwrap_or(0)
}

/// Options for creating scopes; mirrors the construct builders' outputs.
#[derive(Debug, Clone, Default)]
pub struct ScopeOptions {
    pub signature: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub modifiers: Vec<Modifier>,
    pub generic_parameters: Vec<GenericParameter>,
    pub heritage_clauses: Vec<HeritageClause>,
    pub members: Vec<Member>,
    pub enum_members: Vec<EnumMember>,
    pub doc_comment: Option<String>,
    pub parent: Option<String>,
    pub depth: u32,
}

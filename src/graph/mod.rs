pub mod resolver;
pub mod types;

pub use resolver::{RelationshipResolver, ResolutionResult};
pub use types::{
    RelationshipType, ResolutionStats, ResolvedRelationship, UnresolvedReason,
    UnresolvedReference,
};

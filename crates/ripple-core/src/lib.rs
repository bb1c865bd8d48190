//! Core shared types for the ripple workspace.
//!
//! This crate holds the identity types (`TypeId`, `MethodId`), the collaborator traits the
//! ripple computation is written against, and cooperative cancellation.

mod cancel;
mod ids;
mod model;

pub use cancel::{CancellationToken, ProgressMonitor, RippleProgress};
pub use ids::{
    erase_type, is_java_identifier, MethodId, MethodRef, PackageName, ParseMethodRefError,
    TypeId, TypeKind,
};
pub use model::{
    HierarchyProvider, MethodPattern, MethodSearch, ModelError, OverrideTester, ScopeIncludes,
    SearchMatch, SearchScope, SharedHierarchy, TypeHierarchy, TypeMembers, TypeModel, Visibility,
};

use serde::{Deserialize, Serialize};

/// How the override partition forest links two representatives.
///
/// Both strategies produce the same partitions; they only differ in the shape of the forest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnionStrategy {
    /// Point the first representative at the second.
    #[default]
    Link,
    /// Attach the smaller tree below the larger one.
    BySize,
}

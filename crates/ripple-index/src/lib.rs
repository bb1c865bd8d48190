//! In-memory Java type universe.
//!
//! `TypeUniverse` is built from plain declarations (usually loaded from a JSON fixture) and
//! implements the collaborator traits from `ripple-core`: declaration search, hierarchy
//! construction, visibility and override testing.

mod decl;
mod hierarchy;
mod inheritance;
mod universe;

pub use decl::{Access, MethodDecl, TypeDecl};
pub use hierarchy::MaterializedHierarchy;
pub use inheritance::{InheritanceEdge, InheritanceIndex};
pub use universe::{TypeUniverse, UniverseError, UniverseFile};

//! Collaborator interfaces the ripple computation is written against.
//!
//! Production hosts back these with their symbol index and hierarchy services;
//! `ripple-index` provides an in-memory implementation for fixtures and the CLI.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;
use thiserror::Error;

use crate::{is_java_identifier, MethodId, PackageName, ProgressMonitor, TypeId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("unknown method `{0}`")]
    UnknownMethod(String),
    #[error("inconsistent type model: {0}")]
    Inconsistent(String),
    #[error("operation cancelled")]
    Cancelled,
}

/// Declaration search pattern: name plus erased parameter types.
///
/// Matching ignores the declaring type and the return type, compares parameters by erasure and
/// names case-sensitively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodPattern {
    name: SmolStr,
    params: Vec<SmolStr>,
}

impl MethodPattern {
    /// Returns `None` when no pattern can be built for `method` (for example an invalid name).
    pub fn for_method(method: &MethodId) -> Option<Self> {
        if !is_java_identifier(method.name()) {
            return None;
        }
        Some(Self {
            name: SmolStr::new(method.name()),
            params: method.param_types().to_vec(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_types(&self) -> &[SmolStr] {
        &self.params
    }

    pub fn matches(&self, method: &MethodId) -> bool {
        method.name() == self.name.as_str() && method.param_types() == self.params.as_slice()
    }
}

/// Which parts of the workspace a declaration search covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeIncludes {
    pub sources: bool,
    pub application_libraries: bool,
    pub system_libraries: bool,
}

impl ScopeIncludes {
    pub const ALL: ScopeIncludes = ScopeIncludes {
        sources: true,
        application_libraries: true,
        system_libraries: true,
    };

    pub fn includes_binaries(&self) -> bool {
        self.application_libraries || self.system_libraries
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchScope {
    /// Only the compilation unit that declares the given type.
    CompilationUnitOf(TypeId),
    /// Every project related to the seed's project.
    RelatedProjects(ScopeIncludes),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchMatch {
    pub method: MethodId,
    /// Declared in compiled code (a class file) rather than in source.
    pub is_binary: bool,
    /// Compilation unit or archive path the match was found in.
    pub container: SmolStr,
}

pub trait MethodSearch {
    fn search_declarations(
        &self,
        pattern: &MethodPattern,
        scope: &SearchScope,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Vec<SearchMatch>, ModelError>;
}

/// A constructed type hierarchy. Queries for types outside the hierarchy return empty lists.
pub trait TypeHierarchy: fmt::Debug {
    /// Direct supertypes.
    fn supertypes(&self, ty: &TypeId) -> Vec<TypeId>;
    /// Direct subtypes.
    fn subtypes(&self, ty: &TypeId) -> Vec<TypeId>;
    fn all_subtypes(&self, ty: &TypeId) -> Vec<TypeId>;
    fn all_supertypes(&self, ty: &TypeId) -> Vec<TypeId>;
    fn all_classes(&self) -> Vec<TypeId>;
    fn all_interfaces(&self) -> Vec<TypeId>;
    fn contains(&self, ty: &TypeId) -> bool;
}

pub type SharedHierarchy = Arc<dyn TypeHierarchy>;

/// Hierarchy construction. Both calls are assumed to be expensive.
pub trait HierarchyProvider {
    /// Hierarchy over `region` and every supertype of the region's types.
    fn region_hierarchy(
        &self,
        region: &[TypeId],
        monitor: &dyn ProgressMonitor,
    ) -> Result<SharedHierarchy, ModelError>;

    /// Complete hierarchy of one type: all of its supertypes and all of its subtypes.
    fn type_hierarchy(
        &self,
        focus: &TypeId,
        monitor: &dyn ProgressMonitor,
    ) -> Result<SharedHierarchy, ModelError>;
}

pub trait Visibility {
    /// Whether `method` is overridden (rather than shadowed) when seen from a subtype declared
    /// in `from`.
    fn is_visible_in_hierarchy(
        &self,
        method: &MethodId,
        from: &PackageName,
    ) -> Result<bool, ModelError>;

    /// Eligible for dynamic dispatch: not private, not static, not a constructor.
    fn is_virtual(&self, method: &MethodId) -> Result<bool, ModelError>;
}

pub trait OverrideTester {
    /// All methods in supertypes of the declaring type (as seen in `hierarchy`) that `method`
    /// overrides.
    fn find_all_overridden_methods(
        &self,
        method: &MethodId,
        hierarchy: &dyn TypeHierarchy,
    ) -> Result<Vec<MethodId>, ModelError>;
}

pub trait TypeMembers {
    /// Names of all methods declared directly in `ty`.
    fn method_names(&self, ty: &TypeId) -> Result<Vec<SmolStr>, ModelError>;
}

/// Everything the ripple computation needs from its host.
pub trait TypeModel:
    MethodSearch + HierarchyProvider + Visibility + OverrideTester + TypeMembers
{
}

impl<T> TypeModel for T where
    T: ?Sized + MethodSearch + HierarchyProvider + Visibility + OverrideTester + TypeMembers
{
}

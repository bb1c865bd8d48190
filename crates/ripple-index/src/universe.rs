use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use ripple_core::{
    is_java_identifier, HierarchyProvider, MethodId, MethodPattern, MethodRef, MethodSearch,
    ModelError, OverrideTester, PackageName, ProgressMonitor, SearchMatch, SearchScope,
    SharedHierarchy, TypeHierarchy, TypeId, TypeKind, TypeMembers, Visibility,
};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::decl::{Access, MethodDecl, TypeDecl};
use crate::hierarchy::MaterializedHierarchy;
use crate::inheritance::{InheritanceEdge, InheritanceIndex};

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("failed to read universe file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse universe json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("type `{0}` is declared more than once")]
    DuplicateType(String),
    #[error("`{0}` is not a valid qualified type name")]
    InvalidTypeName(String),
    #[error("`{method}` in `{ty}` is not a valid method name")]
    InvalidMethodName { ty: String, method: String },
    #[error("interface `{0}` cannot extend a class")]
    InterfaceWithSuperclass(String),
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("no method `{0}` in the universe")]
    UnknownMethod(String),
}

/// On-disk form of a universe: `{ "types": [ ... ] }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniverseFile {
    pub types: Vec<TypeDecl>,
}

#[derive(Debug)]
struct TypeEntry {
    id: TypeId,
    unit: SmolStr,
    binary: bool,
    methods: Vec<(MethodId, MethodDecl)>,
}

/// An immutable, in-memory snapshot of a Java type universe.
///
/// Implements every collaborator the ripple computation needs, so fixtures and the CLI can run
/// the algorithm without a real index.
#[derive(Debug)]
pub struct TypeUniverse {
    types: BTreeMap<SmolStr, TypeEntry>,
    inheritance: InheritanceIndex,
}

impl TypeUniverse {
    pub fn new(decls: impl IntoIterator<Item = TypeDecl>) -> Result<Self, UniverseError> {
        let mut types: BTreeMap<SmolStr, TypeEntry> = BTreeMap::new();
        let mut edges = Vec::new();

        for decl in decls {
            validate(&decl)?;
            let name = SmolStr::new(decl.name.trim());
            if types.contains_key(&name) {
                return Err(UniverseError::DuplicateType(decl.name));
            }

            let id = TypeId::new(&name, decl.kind);
            for supertype in decl.super_class.iter().chain(decl.interfaces.iter()) {
                edges.push(InheritanceEdge {
                    subtype: name.clone(),
                    supertype: SmolStr::new(supertype.trim()),
                });
            }

            let unit = SmolStr::new(
                decl.compilation_unit
                    .clone()
                    .unwrap_or_else(|| decl.default_unit()),
            );
            let methods = decl
                .methods
                .into_iter()
                .map(|m| (MethodId::new(id.clone(), &m.name, &m.params), m))
                .collect();

            types.insert(
                name,
                TypeEntry {
                    id,
                    unit,
                    binary: decl.binary,
                    methods,
                },
            );
        }

        let mut inheritance = InheritanceIndex::default();
        inheritance.extend(edges);

        tracing::debug!(
            types = types.len(),
            edges = inheritance.edge_count(),
            "built type universe"
        );

        Ok(Self { types, inheritance })
    }

    pub fn from_json_str(text: &str) -> Result<Self, UniverseError> {
        let file: UniverseFile = serde_json::from_str(text)?;
        Self::new(file.types)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, UniverseError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| UniverseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.types.get(name.trim()).map(|entry| entry.id.clone())
    }

    pub fn type_ids(&self) -> impl Iterator<Item = &TypeId> + '_ {
        self.types.values().map(|entry| &entry.id)
    }

    pub fn is_binary(&self, ty: &TypeId) -> bool {
        self.entry(ty).map(|entry| entry.binary).unwrap_or(false)
    }

    /// Look up a declared method by type name, method name and (unerased) parameter types.
    pub fn method<I, S>(&self, type_name: &str, name: &str, params: I) -> Option<MethodId>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.types.get(type_name.trim())?;
        let wanted = MethodId::new(entry.id.clone(), name, params);
        entry
            .methods
            .iter()
            .find(|(id, _)| *id == wanted)
            .map(|(id, _)| id.clone())
    }

    pub fn resolve(&self, method: &MethodRef) -> Result<MethodId, UniverseError> {
        if !self.types.contains_key(method.type_name.trim()) {
            return Err(UniverseError::UnknownType(method.type_name.clone()));
        }
        self.method(&method.type_name, &method.name, &method.params)
            .ok_or_else(|| {
                UniverseError::UnknownMethod(format!(
                    "{}#{}({})",
                    method.type_name,
                    method.name,
                    method.params.join(", ")
                ))
            })
    }

    fn entry(&self, ty: &TypeId) -> Result<&TypeEntry, ModelError> {
        self.types
            .get(ty.qualified_name())
            .filter(|entry| entry.id == *ty)
            .ok_or_else(|| ModelError::UnknownType(ty.to_string()))
    }

    fn method_decl(&self, method: &MethodId) -> Result<(&TypeEntry, &MethodDecl), ModelError> {
        let entry = self.entry(method.declaring_type())?;
        entry
            .methods
            .iter()
            .find(|(id, _)| id == method)
            .map(|(_, decl)| (entry, decl))
            .ok_or_else(|| ModelError::UnknownMethod(method.to_string()))
    }

    fn hierarchy_over(&self, members: impl IntoIterator<Item = TypeId>) -> MaterializedHierarchy {
        MaterializedHierarchy::new(members, |ty| {
            self.inheritance.direct_supertypes(ty.qualified_name())
        })
    }

    fn known(&self, names: Vec<SmolStr>) -> impl Iterator<Item = TypeId> + '_ {
        names
            .into_iter()
            .filter_map(|name| self.types.get(&name).map(|entry| entry.id.clone()))
    }
}

fn validate(decl: &TypeDecl) -> Result<(), UniverseError> {
    let name = decl.name.trim();
    let valid_name = !name.is_empty()
        && name
            .split(|c| c == '.' || c == '$')
            .all(is_java_identifier);
    if !valid_name {
        return Err(UniverseError::InvalidTypeName(decl.name.clone()));
    }
    if decl.kind == TypeKind::Interface && decl.super_class.is_some() {
        return Err(UniverseError::InterfaceWithSuperclass(decl.name.clone()));
    }
    for method in &decl.methods {
        if !is_java_identifier(method.name.trim()) {
            return Err(UniverseError::InvalidMethodName {
                ty: decl.name.clone(),
                method: method.name.clone(),
            });
        }
    }
    Ok(())
}

fn is_visible(entry: &TypeEntry, decl: &MethodDecl, from: &PackageName) -> bool {
    if entry.id.is_interface() {
        return true;
    }
    match decl.access {
        Access::Public | Access::Protected => true,
        Access::Private => false,
        Access::Package => entry.id.package() == *from,
    }
}

fn check_cancelled(monitor: &dyn ProgressMonitor) -> Result<(), ModelError> {
    if monitor.is_cancelled() {
        Err(ModelError::Cancelled)
    } else {
        Ok(())
    }
}

impl MethodSearch for TypeUniverse {
    fn search_declarations(
        &self,
        pattern: &MethodPattern,
        scope: &SearchScope,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Vec<SearchMatch>, ModelError> {
        let unit = match scope {
            SearchScope::CompilationUnitOf(ty) => Some(self.entry(ty)?.unit.clone()),
            SearchScope::RelatedProjects(_) => None,
        };

        let mut matches = Vec::new();
        for entry in self.types.values() {
            check_cancelled(monitor)?;
            let in_scope = match scope {
                SearchScope::CompilationUnitOf(_) => unit.as_ref() == Some(&entry.unit),
                SearchScope::RelatedProjects(includes) => {
                    if entry.binary {
                        includes.includes_binaries()
                    } else {
                        includes.sources
                    }
                }
            };
            if !in_scope {
                continue;
            }

            for (method, decl) in &entry.methods {
                if decl.constructor || !pattern.matches(method) {
                    continue;
                }
                matches.push(SearchMatch {
                    method: method.clone(),
                    is_binary: entry.binary,
                    container: entry.unit.clone(),
                });
            }
        }

        tracing::trace!(pattern = pattern.name(), matches = matches.len(), "declaration search");
        Ok(matches)
    }
}

impl HierarchyProvider for TypeUniverse {
    fn region_hierarchy(
        &self,
        region: &[TypeId],
        monitor: &dyn ProgressMonitor,
    ) -> Result<SharedHierarchy, ModelError> {
        let mut members: Vec<TypeId> = Vec::new();
        for ty in region {
            check_cancelled(monitor)?;
            let entry = self.entry(ty)?;
            members.push(entry.id.clone());
            members.extend(self.known(self.inheritance.all_supertypes(ty.qualified_name())));
        }
        let hierarchy = self.hierarchy_over(members);
        tracing::trace!(region = region.len(), types = hierarchy.len(), "region hierarchy");
        Ok(Arc::new(hierarchy))
    }

    fn type_hierarchy(
        &self,
        focus: &TypeId,
        monitor: &dyn ProgressMonitor,
    ) -> Result<SharedHierarchy, ModelError> {
        check_cancelled(monitor)?;
        let entry = self.entry(focus)?;
        let name = focus.qualified_name();
        let members = std::iter::once(entry.id.clone())
            .chain(self.known(self.inheritance.all_supertypes(name)))
            .chain(self.known(self.inheritance.all_subtypes(name)))
            .collect::<Vec<_>>();
        let hierarchy = self.hierarchy_over(members);
        tracing::trace!(focus = %focus, types = hierarchy.len(), "type hierarchy");
        Ok(Arc::new(hierarchy))
    }
}

impl Visibility for TypeUniverse {
    fn is_visible_in_hierarchy(
        &self,
        method: &MethodId,
        from: &PackageName,
    ) -> Result<bool, ModelError> {
        let (entry, decl) = self.method_decl(method)?;
        Ok(is_visible(entry, decl, from))
    }

    fn is_virtual(&self, method: &MethodId) -> Result<bool, ModelError> {
        let (_, decl) = self.method_decl(method)?;
        Ok(decl.is_virtual())
    }
}

impl OverrideTester for TypeUniverse {
    fn find_all_overridden_methods(
        &self,
        method: &MethodId,
        hierarchy: &dyn TypeHierarchy,
    ) -> Result<Vec<MethodId>, ModelError> {
        let (_, decl) = self.method_decl(method)?;
        if !decl.is_virtual() {
            return Ok(Vec::new());
        }

        let from = method.declaring_type().package();
        let mut overridden = Vec::new();
        for supertype in hierarchy.all_supertypes(method.declaring_type()) {
            let Ok(entry) = self.entry(&supertype) else {
                continue;
            };
            for (candidate, candidate_decl) in &entry.methods {
                if candidate.same_signature(method)
                    && candidate_decl.is_virtual()
                    && is_visible(entry, candidate_decl, &from)
                {
                    overridden.push(candidate.clone());
                }
            }
        }
        Ok(overridden)
    }
}

impl TypeMembers for TypeUniverse {
    fn method_names(&self, ty: &TypeId) -> Result<Vec<SmolStr>, ModelError> {
        let entry = self.entry(ty)?;
        Ok(entry
            .methods
            .iter()
            .map(|(id, _)| SmolStr::new(id.name()))
            .collect())
    }
}

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ripple_core::{TypeHierarchy, TypeId};
use smol_str::SmolStr;

/// A hierarchy materialized over a fixed set of member types.
///
/// Only edges between members are kept, so queries never leave the member set.
#[derive(Debug, Default)]
pub struct MaterializedHierarchy {
    types: BTreeMap<SmolStr, TypeId>,
    supertypes: BTreeMap<SmolStr, Vec<TypeId>>,
    subtypes: BTreeMap<SmolStr, Vec<TypeId>>,
}

impl MaterializedHierarchy {
    /// `direct_supertypes` is consulted for every member; supertypes outside `members` are
    /// dropped.
    pub fn new<'a, F>(members: impl IntoIterator<Item = TypeId>, direct_supertypes: F) -> Self
    where
        F: Fn(&TypeId) -> &'a [SmolStr],
    {
        let types: BTreeMap<SmolStr, TypeId> = members
            .into_iter()
            .map(|ty| (SmolStr::new(ty.qualified_name()), ty))
            .collect();

        let mut supertypes: BTreeMap<SmolStr, Vec<TypeId>> = BTreeMap::new();
        let mut subtypes: BTreeMap<SmolStr, Vec<TypeId>> = BTreeMap::new();
        for (name, ty) in &types {
            for super_name in direct_supertypes(ty) {
                let Some(super_ty) = types.get(super_name) else {
                    continue;
                };
                supertypes
                    .entry(name.clone())
                    .or_default()
                    .push(super_ty.clone());
                subtypes
                    .entry(super_name.clone())
                    .or_default()
                    .push(ty.clone());
            }
        }

        Self {
            types,
            supertypes,
            subtypes,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn walk(&self, map: &BTreeMap<SmolStr, Vec<TypeId>>, base: &TypeId) -> Vec<TypeId> {
        if !self.contains(base) {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        seen.insert(base.qualified_name());
        let mut queue: VecDeque<&TypeId> = map
            .get(base.qualified_name())
            .into_iter()
            .flatten()
            .collect();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.qualified_name()) {
                continue;
            }
            out.push(next.clone());
            if let Some(more) = map.get(next.qualified_name()) {
                queue.extend(more.iter());
            }
        }
        out
    }
}

impl TypeHierarchy for MaterializedHierarchy {
    fn supertypes(&self, ty: &TypeId) -> Vec<TypeId> {
        if !self.contains(ty) {
            return Vec::new();
        }
        self.supertypes
            .get(ty.qualified_name())
            .cloned()
            .unwrap_or_default()
    }

    fn subtypes(&self, ty: &TypeId) -> Vec<TypeId> {
        if !self.contains(ty) {
            return Vec::new();
        }
        self.subtypes
            .get(ty.qualified_name())
            .cloned()
            .unwrap_or_default()
    }

    fn all_subtypes(&self, ty: &TypeId) -> Vec<TypeId> {
        self.walk(&self.subtypes, ty)
    }

    fn all_supertypes(&self, ty: &TypeId) -> Vec<TypeId> {
        self.walk(&self.supertypes, ty)
    }

    fn all_classes(&self) -> Vec<TypeId> {
        self.types
            .values()
            .filter(|ty| !ty.is_interface())
            .cloned()
            .collect()
    }

    fn all_interfaces(&self) -> Vec<TypeId> {
        self.types
            .values()
            .filter(|ty| ty.is_interface())
            .cloned()
            .collect()
    }

    fn contains(&self, ty: &TypeId) -> bool {
        self.types.get(ty.qualified_name()) == Some(ty)
    }
}

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use ripple_core::{TypeHierarchy, TypeId, TypeModel, UnionStrategy};

use crate::candidates::CandidateSet;
use crate::finder::RippleError;

/// Union-find over the types that declare ripple candidates.
///
/// Each type is interned into a dense index on [`Partition::init`]; the forest itself is a plain
/// parent array with path compression, so the algorithm never relies on how the host model
/// hashes or compares its type handles beyond the initial interning.
#[derive(Debug)]
pub(crate) struct Partition {
    types: IndexSet<TypeId>,
    parent: Vec<usize>,
    size: Vec<usize>,
    /// `false` once the type has been linked to an overridden supertype.
    roots: Vec<bool>,
    strategy: UnionStrategy,
}

impl Partition {
    pub(crate) fn new(strategy: UnionStrategy) -> Self {
        Self {
            types: IndexSet::new(),
            parent: Vec::new(),
            size: Vec::new(),
            roots: Vec::new(),
            strategy,
        }
    }

    /// Build the override partitions of all candidate declaring types.
    pub(crate) fn build(
        model: &dyn TypeModel,
        candidates: &CandidateSet,
        hierarchy: &dyn TypeHierarchy,
        strategy: UnionStrategy,
    ) -> Result<Self, RippleError> {
        let mut partition = Self::new(strategy);
        for ty in candidates.declaring_types() {
            partition.init(ty.clone());
        }

        let mut visited = HashSet::new();
        for idx in 0..partition.len() {
            partition.unite_with_supertypes(idx, model, candidates, hierarchy, &mut visited)?;
        }
        Ok(partition)
    }

    pub(crate) fn init(&mut self, ty: TypeId) -> usize {
        let (idx, inserted) = self.types.insert_full(ty);
        debug_assert!(inserted, "type initialized twice: {:?}", self.types[idx]);
        if inserted {
            self.parent.push(idx);
            self.size.push(1);
            self.roots.push(true);
        }
        idx
    }

    pub(crate) fn len(&self) -> usize {
        self.types.len()
    }

    pub(crate) fn index_of(&self, ty: &TypeId) -> Option<usize> {
        self.types.get_index_of(ty)
    }

    pub(crate) fn type_at(&self, idx: usize) -> &TypeId {
        &self.types[idx]
    }

    /// Representative index of `ty`, or `None` when `ty` was never initialized.
    pub(crate) fn find(&mut self, ty: &TypeId) -> Option<usize> {
        let idx = self.index_of(ty)?;
        Some(self.find_index(idx))
    }

    fn find_index(&mut self, idx: usize) -> usize {
        let mut root = idx;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Path compression.
        let mut current = idx;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merge two representatives.
    pub(crate) fn union(&mut self, rep1: usize, rep2: usize) {
        if rep1 == rep2 {
            return;
        }
        let (child, parent) = match self.strategy {
            UnionStrategy::Link => (rep1, rep2),
            UnionStrategy::BySize if self.size[rep1] > self.size[rep2] => (rep2, rep1),
            UnionStrategy::BySize => (rep1, rep2),
        };
        self.parent[child] = parent;
        self.size[parent] += self.size[child];
    }

    fn unite_with_supertypes(
        &mut self,
        start: usize,
        model: &dyn TypeModel,
        candidates: &CandidateSet,
        hierarchy: &dyn TypeHierarchy,
        visited: &mut HashSet<(usize, TypeId)>,
    ) -> Result<(), RippleError> {
        let mut worklist = vec![(start, self.types[start].clone())];
        while let Some((anchor, current)) = worklist.pop() {
            if !visited.insert((anchor, current.clone())) {
                continue;
            }

            let anchor_package = self.types[anchor].package();
            for supertype in hierarchy.supertypes(&current) {
                let Some(super_idx) = self.index_of(&supertype) else {
                    // Declares nothing of interest, but its supertypes might.
                    worklist.push((anchor, supertype));
                    continue;
                };

                let mut overridden = false;
                for super_method in candidates.methods_of(&supertype) {
                    if model.is_visible_in_hierarchy(super_method, &anchor_package)? {
                        let rep = self.find_index(anchor);
                        let super_rep = self.find_index(super_idx);
                        self.union(rep, super_rep);
                        self.roots[anchor] = false;
                        overridden = true;
                        tracing::trace!(
                            sub = %self.types[anchor],
                            sup = %supertype,
                            "override edge"
                        );
                    } else {
                        tracing::trace!(
                            method = %super_method,
                            from = %anchor_package,
                            "not overridden; chain ends"
                        );
                    }
                }

                if overridden {
                    worklist.push((super_idx, supertype));
                }
            }
        }
        Ok(())
    }

    /// Representative → member types, in interning order.
    pub(crate) fn partitioning(&mut self) -> IndexMap<usize, Vec<TypeId>> {
        let mut out: IndexMap<usize, Vec<TypeId>> = IndexMap::new();
        for idx in 0..self.len() {
            let rep = self.find_index(idx);
            out.entry(rep).or_default().push(self.types[idx].clone());
        }
        out
    }

    /// Representative → the root types of that partition.
    pub(crate) fn roots_by_rep(&mut self) -> IndexMap<usize, Vec<TypeId>> {
        let mut out: IndexMap<usize, Vec<TypeId>> = IndexMap::new();
        for idx in 0..self.len() {
            if !self.roots[idx] {
                continue;
            }
            let rep = self.find_index(idx);
            out.entry(rep).or_default().push(self.types[idx].clone());
        }
        out
    }
}

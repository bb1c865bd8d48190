use std::collections::HashMap;

use indexmap::IndexMap;
use ripple_core::{ProgressMonitor, SharedHierarchy, TypeId, TypeModel};

use crate::finder::{check_cancelled, RippleError};
use crate::partition::Partition;

/// Per-invocation cache of type hierarchies.
///
/// A type is looked up through its partition: the hierarchy of a root of the same partition
/// usually contains it already, so one hierarchy serves every member below that root.
#[derive(Debug)]
pub(crate) struct HierarchyCache {
    roots_by_rep: IndexMap<usize, Vec<TypeId>>,
    root_hierarchies: HashMap<TypeId, SharedHierarchy>,
    own_hierarchies: HashMap<TypeId, SharedHierarchy>,
    builds: usize,
}

impl HierarchyCache {
    pub(crate) fn new(roots_by_rep: IndexMap<usize, Vec<TypeId>>) -> Self {
        Self {
            roots_by_rep,
            root_hierarchies: HashMap::new(),
            own_hierarchies: HashMap::new(),
            builds: 0,
        }
    }

    /// Number of hierarchies constructed so far.
    pub(crate) fn builds(&self) -> usize {
        self.builds
    }

    pub(crate) fn hierarchy(
        &mut self,
        model: &dyn TypeModel,
        partition: &mut Partition,
        ty: &TypeId,
        monitor: &dyn ProgressMonitor,
    ) -> Result<SharedHierarchy, RippleError> {
        if let Some(rep) = partition.find(ty) {
            for root in self.roots_by_rep.get(&rep).into_iter().flatten() {
                let hierarchy = match self.root_hierarchies.get(root) {
                    Some(hierarchy) => hierarchy.clone(),
                    None => {
                        check_cancelled(monitor)?;
                        let hierarchy = model.type_hierarchy(root, monitor)?;
                        self.builds += 1;
                        check_cancelled(monitor)?;
                        self.root_hierarchies
                            .insert(root.clone(), hierarchy.clone());
                        hierarchy
                    }
                };
                if hierarchy.contains(ty) {
                    return Ok(hierarchy);
                }
            }
        }

        if let Some(hierarchy) = self.own_hierarchies.get(ty) {
            return Ok(hierarchy.clone());
        }
        let hierarchy = self.build_uncached(model, ty, monitor)?;
        self.own_hierarchies.insert(ty.clone(), hierarchy.clone());
        Ok(hierarchy)
    }

    /// Build a fresh hierarchy of `ty` without caching it. The build is still counted.
    pub(crate) fn build_uncached(
        &mut self,
        model: &dyn TypeModel,
        ty: &TypeId,
        monitor: &dyn ProgressMonitor,
    ) -> Result<SharedHierarchy, RippleError> {
        check_cancelled(monitor)?;
        let hierarchy = model.type_hierarchy(ty, monitor)?;
        self.builds += 1;
        check_cancelled(monitor)?;
        Ok(hierarchy)
    }
}

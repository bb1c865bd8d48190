use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use ripple_core::{MethodId, ProgressMonitor, RippleProgress, TypeHierarchy, TypeId, TypeModel};

use crate::candidates::CandidateSet;
use crate::finder::{check_cancelled, RippleError};
use crate::hierarchy_cache::HierarchyCache;
use crate::partition::Partition;

/// Expands the seed's partition with "married" alien partitions.
///
/// An alien partition is married when one of its types and one of the related types share a
/// subtype that inherits the method from both without redeclaring it. Renaming only one side
/// would split dispatch in that subtype, so both sides ripple together.
pub(crate) struct MarriageResolver<'a> {
    model: &'a dyn TypeModel,
    candidates: &'a CandidateSet,
    partition: &'a mut Partition,
    partitioning: IndexMap<usize, Vec<TypeId>>,
    cache: HierarchyCache,
    precheck_ratio: u32,
    monitor: &'a dyn ProgressMonitor,
}

#[derive(Debug)]
pub(crate) struct Marriage {
    pub(crate) methods: Vec<MethodId>,
    pub(crate) rounds: u32,
    pub(crate) hierarchy_builds: usize,
}

impl<'a> MarriageResolver<'a> {
    pub(crate) fn new(
        model: &'a dyn TypeModel,
        candidates: &'a CandidateSet,
        partition: &'a mut Partition,
        partitioning: IndexMap<usize, Vec<TypeId>>,
        precheck_ratio: u32,
        monitor: &'a dyn ProgressMonitor,
    ) -> Self {
        let cache = HierarchyCache::new(partition.roots_by_rep());
        Self {
            model,
            candidates,
            partition,
            partitioning,
            cache,
            precheck_ratio,
            monitor,
        }
    }

    pub(crate) fn resolve(mut self, seed: &MethodId) -> Result<Marriage, RippleError> {
        let model = self.model;
        let candidates = self.candidates;
        let monitor = self.monitor;

        let seed_type = seed.declaring_type();
        let seed_rep = self
            .partition
            .find(seed_type)
            .ok_or_else(|| RippleError::IntegrityViolation { seed: seed.clone() })?;
        let related_types = self
            .partitioning
            .get(&seed_rep)
            .cloned()
            .unwrap_or_default();

        let mut related: IndexSet<MethodId> = IndexSet::new();
        let mut has_related_interfaces = false;
        for ty in &related_types {
            related.extend(candidates.methods_of(ty).iter().cloned());
            has_related_interfaces |= ty.is_interface();
        }

        // Alien types shrink as they marry a related type.
        let mut alien_types: IndexSet<TypeId> = IndexSet::new();
        let mut has_alien_interfaces = false;
        for method in candidates.iter() {
            if related.contains(method) {
                continue;
            }
            let ty = method.declaring_type();
            has_alien_interfaces |= ty.is_interface();
            alien_types.insert(ty.clone());
        }

        if alien_types.is_empty() {
            return Ok(self.finish(related, 0));
        }
        // A class inherits from a single class chain; two hierarchies can only meet through
        // an interface.
        if !has_related_interfaces && !has_alien_interfaces {
            return Ok(self.finish(related, 0));
        }

        check_cancelled(monitor)?;
        // The root hierarchy of the representative may not contain the seed type itself.
        let seed_hierarchy = self
            .cache
            .hierarchy(model, self.partition, seed_type, monitor)?;
        let seed_subtypes = seed_hierarchy.all_subtypes(seed_type);
        if self.precheck_applies(seed_subtypes.len())
            && !self.could_have_married_alien_types(seed, &*seed_hierarchy, &seed_subtypes)?
        {
            tracing::debug!(
                subtypes = seed_subtypes.len(),
                "no subtype inherits a same-named method from outside the seed hierarchy"
            );
            return Ok(self.finish(related, 0));
        }

        let mut related_subtypes: HashSet<TypeId> = HashSet::new();
        let mut to_process = related_types;
        let mut rounds = 0u32;
        while !to_process.is_empty() {
            rounds += 1;
            monitor.report(RippleProgress::MarriageRound(rounds));
            check_cancelled(monitor)?;

            for ty in std::mem::take(&mut to_process) {
                check_cancelled(monitor)?;
                let hierarchy = self.cache.hierarchy(model, self.partition, &ty, monitor)?;
                related_subtypes.extend(hierarchy.all_subtypes(&ty));
            }

            let mut married: IndexSet<usize> = IndexSet::new();
            for alien in &alien_types {
                check_cancelled(monitor)?;
                for alien_method in candidates.methods_of(alien) {
                    let hierarchy = self.cache.hierarchy(model, self.partition, alien, monitor)?;
                    for subtype in hierarchy.all_subtypes(alien) {
                        if !related_subtypes.contains(&subtype) {
                            continue;
                        }
                        if model.is_visible_in_hierarchy(alien_method, &subtype.package())? {
                            if let Some(rep) = self.partition.find(alien) {
                                married.insert(rep);
                            }
                        }
                    }
                }
            }

            if married.is_empty() {
                break;
            }

            let aliens_before = alien_types.len();
            for rep in married {
                let members = self.partitioning.get(&rep).cloned().unwrap_or_default();
                for member in &members {
                    related.extend(candidates.methods_of(member).iter().cloned());
                    alien_types.shift_remove(member);
                }
                tracing::debug!(
                    round = rounds,
                    partition = %self.partition.type_at(rep),
                    members = members.len(),
                    "married alien partition"
                );
                to_process.extend(members);
            }
            debug_assert!(alien_types.len() < aliens_before, "alien set must shrink");
        }

        Ok(self.finish(related, rounds))
    }

    fn finish(&self, related: IndexSet<MethodId>, rounds: u32) -> Marriage {
        Marriage {
            methods: related.into_iter().collect(),
            rounds,
            hierarchy_builds: self.cache.builds(),
        }
    }

    fn precheck_applies(&self, subtypes: usize) -> bool {
        self.precheck_ratio > 0 && subtypes <= self.candidates.len() / self.precheck_ratio as usize
    }

    /// Whether any subtype of the seed's type inherits a same-named method from a supertype
    /// outside the seed's hierarchy. If none does, no alien type can be married.
    fn could_have_married_alien_types(
        &mut self,
        seed: &MethodId,
        seed_hierarchy: &dyn TypeHierarchy,
        seed_subtypes: &[TypeId],
    ) -> Result<bool, RippleError> {
        let in_seed_hierarchy: HashSet<TypeId> = seed_hierarchy
            .all_classes()
            .into_iter()
            .chain(seed_hierarchy.all_interfaces())
            .collect();

        for subtype in seed_subtypes {
            let hierarchy = self
                .cache
                .build_uncached(self.model, subtype, self.monitor)?;
            for supertype in hierarchy.all_supertypes(subtype) {
                check_cancelled(self.monitor)?;
                if in_seed_hierarchy.contains(&supertype) {
                    continue;
                }
                // Name only: binary declarations may spell parameter types differently.
                let names = self.model.method_names(&supertype)?;
                if names.iter().any(|name| name == seed.name()) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

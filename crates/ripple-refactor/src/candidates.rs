use indexmap::{IndexMap, IndexSet};
use ripple_core::{
    MethodId, MethodPattern, ProgressMonitor, ScopeIncludes, SearchMatch, SearchScope,
    TypeHierarchy, TypeId, TypeModel,
};

use crate::finder::{check_cancelled, BinaryMatchSink, RippleError, RippleScope};

/// Method declarations that may share the seed's override chain, grouped by declaring type.
#[derive(Debug, Default)]
pub(crate) struct CandidateSet {
    methods: IndexSet<MethodId>,
    by_type: IndexMap<TypeId, Vec<MethodId>>,
}

impl CandidateSet {
    pub(crate) fn insert(&mut self, method: MethodId) -> bool {
        if !self.methods.insert(method.clone()) {
            return false;
        }
        self.by_type
            .entry(method.declaring_type().clone())
            .or_default()
            .push(method);
        true
    }

    pub(crate) fn contains(&self, method: &MethodId) -> bool {
        self.methods.contains(method)
    }

    pub(crate) fn len(&self) -> usize {
        self.methods.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &MethodId> + '_ {
        self.methods.iter()
    }

    pub(crate) fn declaring_types(&self) -> impl Iterator<Item = &TypeId> + '_ {
        self.by_type.keys()
    }

    /// Candidates declared directly in `ty`; empty for types without candidates.
    pub(crate) fn methods_of(&self, ty: &TypeId) -> &[MethodId] {
        self.by_type.get(ty).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn into_vec(self) -> Vec<MethodId> {
        self.methods.into_iter().collect()
    }
}

/// Search for every declaration matching the seed by name and erasure that is visible from the
/// seed's package.
pub(crate) fn collect_candidates(
    model: &dyn TypeModel,
    seed: &MethodId,
    scope: RippleScope,
    exclude_binaries: bool,
    mut binary_refs: Option<&mut (dyn BinaryMatchSink + '_)>,
    monitor: &dyn ProgressMonitor,
) -> Result<CandidateSet, RippleError> {
    let mut candidates = CandidateSet::default();
    let Some(pattern) = MethodPattern::for_method(seed) else {
        tracing::debug!(seed = %seed, "no search pattern for seed");
        return Ok(candidates);
    };

    let search_scope = match scope {
        RippleScope::CompilationUnit => {
            SearchScope::CompilationUnitOf(seed.declaring_type().clone())
        }
        RippleScope::Workspace => SearchScope::RelatedProjects(ScopeIncludes::ALL),
    };
    let matches = model.search_declarations(&pattern, &search_scope, monitor)?;
    check_cancelled(monitor)?;

    let seed_package = seed.declaring_type().package();
    let mut routed = 0usize;
    for found in matches {
        if !model.is_visible_in_hierarchy(&found.method, &seed_package)? {
            continue;
        }
        if found.is_binary {
            if let Some(sink) = binary_refs.as_deref_mut() {
                routed += 1;
                sink.accept(found);
                continue;
            }
            if exclude_binaries {
                continue;
            }
        }
        let SearchMatch { method, .. } = found;
        candidates.insert(method);
    }

    tracing::debug!(
        candidates = candidates.len(),
        routed_binaries = routed,
        "collected ripple candidates"
    );
    Ok(candidates)
}

/// Add overridden ancestors the declaration search did not report.
pub(crate) fn complete_overrides(
    model: &dyn TypeModel,
    candidates: &mut CandidateSet,
    hierarchy: &dyn TypeHierarchy,
) -> Result<usize, RippleError> {
    let mut missed = Vec::new();
    for method in candidates.iter() {
        missed.extend(model.find_all_overridden_methods(method, hierarchy)?);
    }

    let mut added = 0usize;
    for method in missed {
        if candidates.insert(method) {
            added += 1;
        }
    }
    if added > 0 {
        tracing::debug!(added, "added overridden ancestors missed by search");
    }
    Ok(added)
}

use ripple_core::{
    MethodId, ModelError, ProgressMonitor, RippleProgress, SearchMatch, TypeId, TypeModel,
    UnionStrategy,
};
use thiserror::Error;

use crate::candidates::{collect_candidates, complete_overrides};
use crate::marriage::MarriageResolver;
use crate::partition::Partition;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RippleError {
    #[error("ripple computation cancelled")]
    Cancelled,
    #[error("`{seed}` is missing from its own ripple candidates")]
    IntegrityViolation { seed: MethodId },
    #[error(transparent)]
    Model(ModelError),
}

impl From<ModelError> for RippleError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Cancelled => RippleError::Cancelled,
            other => RippleError::Model(other),
        }
    }
}

pub(crate) fn check_cancelled(monitor: &dyn ProgressMonitor) -> Result<(), RippleError> {
    if monitor.is_cancelled() {
        Err(RippleError::Cancelled)
    } else {
        Ok(())
    }
}

/// Where candidate declarations are searched for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RippleScope {
    /// Sources, application libraries and system libraries of all related projects.
    #[default]
    Workspace,
    /// Only the compilation unit declaring the seed. Missing ancestors yield an empty result
    /// instead of an error.
    CompilationUnit,
}

/// Receives binary (class file) matches instead of the ripple set.
pub trait BinaryMatchSink {
    fn accept(&mut self, found: SearchMatch);
}

impl BinaryMatchSink for Vec<SearchMatch> {
    fn accept(&mut self, found: SearchMatch) {
        self.push(found);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RippleOptions {
    pub exclude_binaries: bool,
    /// The marriage pre-check runs when the seed type has at most `candidates / precheck_ratio`
    /// subtypes. `0` disables it.
    pub precheck_ratio: u32,
    pub union_strategy: UnionStrategy,
}

impl Default for RippleOptions {
    fn default() -> Self {
        Self {
            exclude_binaries: true,
            precheck_ratio: 10,
            union_strategy: UnionStrategy::default(),
        }
    }
}

/// Work performed by one run. All zero when the seed is not virtual, since nothing is searched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RippleStats {
    /// Size of the candidate set after override completion.
    pub candidates: usize,
    pub partitions: usize,
    pub marriage_rounds: u32,
    /// Type hierarchies built while resolving marriages.
    pub hierarchies_built: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RippleOutcome {
    pub methods: Vec<MethodId>,
    pub stats: RippleStats,
}

/// Computes the ripple set of one method: every declaration that has to change together with it.
///
/// The finder is consumed by [`RippleMethodFinder::run`]; all intermediate state lives for a
/// single invocation.
pub struct RippleMethodFinder<'a> {
    model: &'a dyn TypeModel,
    seed: MethodId,
    options: RippleOptions,
    scope: RippleScope,
    binary_refs: Option<&'a mut (dyn BinaryMatchSink + 'a)>,
}

impl<'a> RippleMethodFinder<'a> {
    pub fn new(model: &'a dyn TypeModel, seed: MethodId) -> Self {
        Self {
            model,
            seed,
            options: RippleOptions::default(),
            scope: RippleScope::Workspace,
            binary_refs: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RippleOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn exclude_binaries(mut self, exclude: bool) -> Self {
        self.options.exclude_binaries = exclude;
        self
    }

    /// Restrict the search to the seed's compilation unit. Binaries are always excluded.
    #[must_use]
    pub fn in_compilation_unit(mut self) -> Self {
        self.scope = RippleScope::CompilationUnit;
        self
    }

    /// Route binary matches to `sink` instead of the ripple set.
    #[must_use]
    pub fn with_binary_refs(mut self, sink: &'a mut (dyn BinaryMatchSink + 'a)) -> Self {
        self.binary_refs = Some(sink);
        self
    }

    pub fn run(self, monitor: &dyn ProgressMonitor) -> Result<RippleOutcome, RippleError> {
        let Self {
            model,
            seed,
            options,
            scope,
            mut binary_refs,
        } = self;
        let _span = tracing::debug_span!("ripple", seed = %seed, ?scope).entered();

        check_cancelled(monitor)?;
        if !model.is_virtual(&seed)? {
            tracing::debug!("seed is not virtual; it ripples only to itself");
            monitor.report(RippleProgress::Done);
            return Ok(RippleOutcome {
                methods: vec![seed],
                stats: RippleStats::default(),
            });
        }

        let exclude_binaries = options.exclude_binaries
            || scope == RippleScope::CompilationUnit
            || binary_refs.is_some();
        let mut candidates = collect_candidates(
            model,
            &seed,
            scope,
            exclude_binaries,
            binary_refs.as_deref_mut(),
            monitor,
        )?;
        monitor.report(RippleProgress::SearchFinished {
            matches: candidates.len(),
        });

        if !candidates.contains(&seed) {
            return match scope {
                RippleScope::Workspace => Err(RippleError::IntegrityViolation { seed }),
                RippleScope::CompilationUnit => {
                    tracing::debug!("seed not found in its compilation unit");
                    monitor.report(RippleProgress::Done);
                    Ok(RippleOutcome::default())
                }
            };
        }

        check_cancelled(monitor)?;
        let region: Vec<TypeId> = candidates.declaring_types().cloned().collect();
        let hierarchy = model.region_hierarchy(&region, monitor)?;
        check_cancelled(monitor)?;

        complete_overrides(model, &mut candidates, &*hierarchy)?;
        check_cancelled(monitor)?;

        let mut partition =
            Partition::build(model, &candidates, &*hierarchy, options.union_strategy)?;
        let partitioning = partition.partitioning();
        let partitions = partitioning.len();
        monitor.report(RippleProgress::PartitionsBuilt { partitions });
        tracing::debug!(
            candidates = candidates.len(),
            partitions,
            "override partitions built"
        );
        check_cancelled(monitor)?;

        let mut stats = RippleStats {
            candidates: candidates.len(),
            partitions,
            ..RippleStats::default()
        };
        let methods = if partitions == 1 {
            candidates.into_vec()
        } else {
            let marriage = MarriageResolver::new(
                model,
                &candidates,
                &mut partition,
                partitioning,
                options.precheck_ratio,
                monitor,
            )
            .resolve(&seed)?;
            stats.marriage_rounds = marriage.rounds;
            stats.hierarchies_built = marriage.hierarchy_builds;
            marriage.methods
        };

        monitor.report(RippleProgress::Done);
        tracing::debug!(
            methods = methods.len(),
            rounds = stats.marriage_rounds,
            "ripple set computed"
        );
        Ok(RippleOutcome { methods, stats })
    }
}

/// Ripple set of `seed` over the whole workspace.
pub fn related_methods(
    model: &dyn TypeModel,
    seed: &MethodId,
    exclude_binaries: bool,
    monitor: &dyn ProgressMonitor,
) -> Result<Vec<MethodId>, RippleError> {
    RippleMethodFinder::new(model, seed.clone())
        .exclude_binaries(exclude_binaries)
        .run(monitor)
        .map(|outcome| outcome.methods)
}

/// Ripple set of `seed` restricted to its own compilation unit.
pub fn related_methods_in_compilation_unit(
    model: &dyn TypeModel,
    seed: &MethodId,
    monitor: &dyn ProgressMonitor,
) -> Result<Vec<MethodId>, RippleError> {
    RippleMethodFinder::new(model, seed.clone())
        .in_compilation_unit()
        .run(monitor)
        .map(|outcome| outcome.methods)
}

/// Ripple set of `seed` over the whole workspace, reporting binary declarations to `binary_refs`.
pub fn related_methods_with_binary_refs(
    model: &dyn TypeModel,
    seed: &MethodId,
    binary_refs: &mut dyn BinaryMatchSink,
    monitor: &dyn ProgressMonitor,
) -> Result<Vec<MethodId>, RippleError> {
    RippleMethodFinder::new(model, seed.clone())
        .with_binary_refs(binary_refs)
        .run(monitor)
        .map(|outcome| outcome.methods)
}

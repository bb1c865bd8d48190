//! Ripple method resolution.
//!
//! Given one method declaration, find every declaration that participates in the same override
//! chain: directly through subtype/supertype overriding, or indirectly when a common subtype
//! inherits the method from two otherwise unrelated hierarchies. Renaming any of them requires
//! renaming all of them.
//!
//! The computation runs in four steps:
//! 1. collect same-named declarations with matching erasure, visible from the seed's package;
//! 2. add overridden ancestors the search missed;
//! 3. partition the declaring types along override edges (union-find);
//! 4. grow the seed's partition with "married" partitions until nothing changes.

mod candidates;
mod finder;
mod hierarchy_cache;
mod marriage;
mod partition;

pub use finder::{
    related_methods, related_methods_in_compilation_unit, related_methods_with_binary_refs,
    BinaryMatchSink, RippleError, RippleMethodFinder, RippleOptions, RippleOutcome, RippleScope,
    RippleStats,
};

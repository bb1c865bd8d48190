use pretty_assertions::assert_eq;
use ripple_core::{CancellationToken, RippleProgress, UnionStrategy};
use ripple_index::{MethodDecl, TypeDecl, TypeUniverse};
use ripple_refactor::{RippleMethodFinder, RippleOptions, RippleStats};

use super::support::{method, names, universe, RecordingMonitor};

fn common_subtype() -> TypeUniverse {
    universe([
        TypeDecl::interface("p.P").method(MethodDecl::public("m")),
        TypeDecl::interface("q.Q").method(MethodDecl::public("m")),
        TypeDecl::class("r.Z").implements(["p.P", "q.Q"]),
    ])
}

/// P, Q, R and S each declare `m`; Z, W and V each join two neighbours, so reaching S from P
/// takes three marriages.
pub(crate) fn interface_chain() -> TypeUniverse {
    universe([
        TypeDecl::interface("p.P").method(MethodDecl::public("m")),
        TypeDecl::interface("p.Q").method(MethodDecl::public("m")),
        TypeDecl::interface("p.R").method(MethodDecl::public("m")),
        TypeDecl::interface("p.S").method(MethodDecl::public("m")),
        TypeDecl::class("p.Z").implements(["p.P", "p.Q"]),
        TypeDecl::class("p.W").implements(["p.Q", "p.R"]),
        TypeDecl::class("p.V").implements(["p.R", "p.S"]),
    ])
}

#[test]
fn common_subtype_marries_unrelated_interfaces() {
    let universe = common_subtype();
    let seed = method(&universe, "p.P", "m");
    let monitor = RecordingMonitor::new();

    let outcome = RippleMethodFinder::new(&universe, seed).run(&monitor).unwrap();
    assert_eq!(names(&outcome.methods), vec!["p.P#m()", "q.Q#m()"]);
    assert_eq!(
        outcome.stats,
        RippleStats {
            candidates: 2,
            partitions: 2,
            marriage_rounds: 2,
            hierarchies_built: 2,
        }
    );
    assert_eq!(
        monitor.events(),
        vec![
            RippleProgress::SearchFinished { matches: 2 },
            RippleProgress::PartitionsBuilt { partitions: 2 },
            RippleProgress::MarriageRound(1),
            RippleProgress::MarriageRound(2),
            RippleProgress::Done,
        ]
    );
}

#[test]
fn marriage_is_symmetric() {
    let universe = common_subtype();
    let seed = method(&universe, "q.Q", "m");

    let outcome = RippleMethodFinder::new(&universe, seed)
        .run(&CancellationToken::new())
        .unwrap();
    assert_eq!(names(&outcome.methods), vec!["p.P#m()", "q.Q#m()"]);
}

#[test]
fn marriages_chain_across_rounds() {
    let universe = interface_chain();
    let seed = method(&universe, "p.P", "m");

    let outcome = RippleMethodFinder::new(&universe, seed)
        .run(&CancellationToken::new())
        .unwrap();
    assert_eq!(
        names(&outcome.methods),
        vec!["p.P#m()", "p.Q#m()", "p.R#m()", "p.S#m()"]
    );
    assert_eq!(outcome.stats.partitions, 4);
    assert_eq!(outcome.stats.marriage_rounds, 4);
}

#[test]
fn alien_method_must_be_visible_from_the_common_subtype() {
    let universe = universe([
        TypeDecl::interface("b.I").method(MethodDecl::public("m")),
        TypeDecl::class("b.Base").method(MethodDecl::package_private("m")),
        TypeDecl::class("c.Z").extends("b.Base").implements(["b.I"]),
    ]);
    let seed = method(&universe, "b.I", "m");

    let outcome = RippleMethodFinder::new(&universe, seed)
        .run(&CancellationToken::new())
        .unwrap();
    assert_eq!(names(&outcome.methods), vec!["b.I#m()"]);
    assert_eq!(outcome.stats.partitions, 2);
    assert_eq!(outcome.stats.marriage_rounds, 1);
}

#[test]
fn classes_alone_never_marry() {
    let universe = universe([
        TypeDecl::class("p.A").method(MethodDecl::public("m")),
        TypeDecl::class("p.B").method(MethodDecl::public("m")),
    ]);
    let seed = method(&universe, "p.A", "m");

    let outcome = RippleMethodFinder::new(&universe, seed.clone())
        .run(&CancellationToken::new())
        .unwrap();
    assert_eq!(outcome.methods, vec![seed]);
    assert_eq!(outcome.stats.partitions, 2);
    assert_eq!(outcome.stats.marriage_rounds, 0);
    assert_eq!(outcome.stats.hierarchies_built, 0);
}

#[test]
fn precheck_skips_the_fixpoint_when_no_subtype_can_marry() {
    let universe = universe([
        TypeDecl::interface("p.I").method(MethodDecl::public("m")),
        TypeDecl::class("p.C").method(MethodDecl::public("m")),
    ]);
    let seed = method(&universe, "p.C", "m");
    let token = CancellationToken::new();

    let with_precheck = RippleMethodFinder::new(&universe, seed.clone())
        .with_options(RippleOptions {
            precheck_ratio: 1,
            ..RippleOptions::default()
        })
        .run(&token)
        .unwrap();
    assert_eq!(with_precheck.methods, vec![seed.clone()]);
    assert_eq!(with_precheck.stats.marriage_rounds, 0);

    let without_precheck = RippleMethodFinder::new(&universe, seed.clone())
        .with_options(RippleOptions {
            precheck_ratio: 0,
            ..RippleOptions::default()
        })
        .run(&token)
        .unwrap();
    assert_eq!(without_precheck.methods, vec![seed]);
    assert_eq!(without_precheck.stats.marriage_rounds, 1);
}

#[test]
fn precheck_lets_possible_marriages_through() {
    let universe = common_subtype();
    let seed = method(&universe, "p.P", "m");

    let outcome = RippleMethodFinder::new(&universe, seed)
        .with_options(RippleOptions {
            precheck_ratio: 1,
            ..RippleOptions::default()
        })
        .run(&CancellationToken::new())
        .unwrap();
    assert_eq!(names(&outcome.methods), vec!["p.P#m()", "q.Q#m()"]);
    assert_eq!(outcome.stats.marriage_rounds, 2);
    // P's hierarchy, the fresh hierarchy of the common subtype Z, then Q's hierarchy.
    assert_eq!(outcome.stats.hierarchies_built, 3);
}

#[test]
fn precheck_only_looks_below_the_seed_type() {
    // C overrides I#m and has no subtypes; E marries J into the partition through I.
    let universe = universe([
        TypeDecl::interface("p.I").method(MethodDecl::public("m")),
        TypeDecl::class("p.C")
            .implements(["p.I"])
            .method(MethodDecl::public("m")),
        TypeDecl::interface("q.J").method(MethodDecl::public("m")),
        TypeDecl::class("p.E").implements(["p.I", "q.J"]),
    ]);
    let seed = method(&universe, "p.C", "m");
    let token = CancellationToken::new();

    let with_precheck = RippleMethodFinder::new(&universe, seed.clone())
        .run(&token)
        .unwrap();
    assert_eq!(names(&with_precheck.methods), vec!["p.C#m()", "p.I#m()"]);
    assert_eq!(with_precheck.stats.partitions, 2);
    assert_eq!(with_precheck.stats.marriage_rounds, 0);

    let without_precheck = RippleMethodFinder::new(&universe, seed)
        .with_options(RippleOptions {
            precheck_ratio: 0,
            ..RippleOptions::default()
        })
        .run(&token)
        .unwrap();
    assert_eq!(
        names(&without_precheck.methods),
        vec!["p.C#m()", "p.I#m()", "q.J#m()"]
    );
    assert_eq!(without_precheck.stats.marriage_rounds, 2);
}

#[test]
fn union_strategies_agree() {
    let universe = universe([
        TypeDecl::interface("p.P").method(MethodDecl::public("m")),
        TypeDecl::interface("p.Q").method(MethodDecl::public("m")),
        TypeDecl::class("p.Base")
            .implements(["p.P"])
            .method(MethodDecl::public("m")),
        TypeDecl::class("p.Mid").extends("p.Base"),
        TypeDecl::class("p.Leaf")
            .extends("p.Mid")
            .implements(["p.Q"])
            .method(MethodDecl::public("m")),
        TypeDecl::class("p.Other").method(MethodDecl::public("m")),
        TypeDecl::interface("p.R").method(MethodDecl::public("m")),
        TypeDecl::class("p.Both").implements(["p.R", "p.Q"]),
    ]);
    let token = CancellationToken::new();

    for seed_type in ["p.P", "p.Leaf", "p.Other", "p.R"] {
        let seed = method(&universe, seed_type, "m");
        let run = |strategy| {
            RippleMethodFinder::new(&universe, seed.clone())
                .with_options(RippleOptions {
                    union_strategy: strategy,
                    ..RippleOptions::default()
                })
                .run(&token)
                .unwrap()
        };
        let linked = run(UnionStrategy::Link);
        let sized = run(UnionStrategy::BySize);
        assert_eq!(names(&linked.methods), names(&sized.methods), "seed {seed}");
        assert_eq!(linked.stats.partitions, sized.stats.partitions);
    }
}

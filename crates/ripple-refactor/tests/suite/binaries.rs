use pretty_assertions::assert_eq;
use ripple_core::{CancellationToken, SearchMatch};
use ripple_index::{MethodDecl, TypeDecl, TypeUniverse};
use ripple_refactor::{
    related_methods, related_methods_in_compilation_unit, related_methods_with_binary_refs,
    RippleError, RippleMethodFinder,
};

use super::support::{method, names, universe};

fn with_library_override() -> TypeUniverse {
    universe([
        TypeDecl::interface("app.Handler").method(MethodDecl::public("handle")),
        TypeDecl::class("app.LocalHandler")
            .implements(["app.Handler"])
            .method(MethodDecl::public("handle")),
        TypeDecl::class("lib.VendorHandler")
            .binary()
            .implements(["app.Handler"])
            .method(MethodDecl::public("handle")),
    ])
}

#[test]
fn binary_overrides_are_excluded_from_the_start() {
    let universe = with_library_override();
    let seed = method(&universe, "app.Handler", "handle");

    let outcome = RippleMethodFinder::new(&universe, seed)
        .run(&CancellationToken::new())
        .unwrap();
    assert_eq!(
        names(&outcome.methods),
        vec!["app.Handler#handle()", "app.LocalHandler#handle()"]
    );
    assert_eq!(outcome.stats.candidates, 2);
}

#[test]
fn binary_overrides_are_kept_when_requested() {
    let universe = with_library_override();
    let seed = method(&universe, "app.Handler", "handle");

    let methods = related_methods(&universe, &seed, false, &CancellationToken::new()).unwrap();
    assert_eq!(
        names(&methods),
        vec![
            "app.Handler#handle()",
            "app.LocalHandler#handle()",
            "lib.VendorHandler#handle()",
        ]
    );
}

#[test]
fn binary_matches_are_routed_to_the_sink() {
    let universe = with_library_override();
    let seed = method(&universe, "app.Handler", "handle");
    let mut binary_refs: Vec<SearchMatch> = Vec::new();

    let methods = related_methods_with_binary_refs(
        &universe,
        &seed,
        &mut binary_refs,
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(
        names(&methods),
        vec!["app.Handler#handle()", "app.LocalHandler#handle()"]
    );
    assert_eq!(
        binary_refs,
        vec![SearchMatch {
            method: method(&universe, "lib.VendorHandler", "handle"),
            is_binary: true,
            container: "lib/VendorHandler.class".into(),
        }]
    );
}

#[test]
fn overridden_binary_ancestor_is_completed() {
    let universe = universe([
        TypeDecl::class("lib.Base")
            .binary()
            .method(MethodDecl::public("close")),
        TypeDecl::class("app.Resource")
            .extends("lib.Base")
            .method(MethodDecl::public("close")),
    ]);
    let seed = method(&universe, "app.Resource", "close");

    // The search drops lib.Base#close, but the override tester puts it back.
    let methods = related_methods(&universe, &seed, true, &CancellationToken::new()).unwrap();
    assert_eq!(names(&methods), vec!["app.Resource#close()", "lib.Base#close()"]);
}

#[test]
fn excluded_binary_seed_is_an_integrity_violation() {
    let universe = with_library_override();
    let seed = method(&universe, "lib.VendorHandler", "handle");

    let err = related_methods(&universe, &seed, true, &CancellationToken::new()).unwrap_err();
    assert_eq!(err, RippleError::IntegrityViolation { seed });
}

#[test]
fn excluded_binary_seed_in_single_file_scope_yields_nothing() {
    let universe = with_library_override();
    let seed = method(&universe, "lib.VendorHandler", "handle");

    let methods =
        related_methods_in_compilation_unit(&universe, &seed, &CancellationToken::new()).unwrap();
    assert!(methods.is_empty());
}

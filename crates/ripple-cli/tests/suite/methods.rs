use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::Value;

const UNIVERSE: &str = r#"{
  "types": [
    { "name": "app.Handler", "kind": "interface",
      "methods": [{ "name": "handle", "params": ["java.util.List<String>"], "access": "public" }] },
    { "name": "app.Audited", "kind": "interface",
      "methods": [{ "name": "handle", "params": ["List"], "access": "public" }] },
    { "name": "app.AuditedHandler", "implements": ["app.Handler", "app.Audited"] },
    { "name": "app.LocalHandler", "implements": ["app.Handler"],
      "methods": [{ "name": "handle", "params": ["List<String>"], "access": "public" }] },
    { "name": "lib.VendorHandler", "binary": true, "implements": ["app.Handler"],
      "methods": [{ "name": "handle", "params": ["List"], "access": "public" }] }
  ]
}"#;

pub(crate) fn ripple() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ripple"))
}

pub(crate) fn universe(temp: &TempDir) -> assert_fs::fixture::ChildPath {
    let file = temp.child("universe.json");
    file.write_str(UNIVERSE).unwrap();
    file
}

#[test]
fn help_mentions_commands() {
    ripple().arg("--help").assert().success().stdout(
        predicate::str::contains("methods").and(predicate::str::contains("config-schema")),
    );
}

#[test]
fn prints_sorted_ripple_set() {
    let temp = TempDir::new().unwrap();
    let universe = universe(&temp);

    ripple()
        .current_dir(temp.path())
        .arg("methods")
        .arg(universe.path())
        .arg("app.Handler#handle(List<String>)")
        .assert()
        .success()
        .stdout("app.Audited#handle(List)\napp.Handler#handle(List)\napp.LocalHandler#handle(List)\n");
}

#[test]
fn json_output_includes_stats() {
    let temp = TempDir::new().unwrap();
    let universe = universe(&temp);

    let output = ripple()
        .current_dir(temp.path())
        .arg("methods")
        .arg(universe.path())
        .arg("app.Handler#handle(java.util.List)")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["seed"], "app.Handler#handle(List)");
    assert_eq!(
        value["methods"],
        serde_json::json!([
            "app.Audited#handle(List)",
            "app.Handler#handle(List)",
            "app.LocalHandler#handle(List)"
        ])
    );
    assert_eq!(value["stats"]["candidates"], 3);
    assert_eq!(value["stats"]["partitions"], 2);
    assert!(value.get("binary_matches").is_none());
}

#[test]
fn binary_refs_are_listed_separately() {
    let temp = TempDir::new().unwrap();
    let universe = universe(&temp);

    ripple()
        .current_dir(temp.path())
        .arg("methods")
        .arg(universe.path())
        .arg("app.Handler#handle(List)")
        .arg("--binary-refs")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "binary:\n  lib.VendorHandler#handle(List) (lib/VendorHandler.class)\n",
        ));
}

#[test]
fn include_binaries_keeps_compiled_declarations() {
    let temp = TempDir::new().unwrap();
    let universe = universe(&temp);

    ripple()
        .current_dir(temp.path())
        .arg("methods")
        .arg(universe.path())
        .arg("app.Handler#handle(List)")
        .arg("--include-binaries")
        .assert()
        .success()
        .stdout(predicate::str::contains("lib.VendorHandler#handle(List)"));
}

#[test]
fn single_file_restricts_the_search() {
    let temp = TempDir::new().unwrap();
    let universe = universe(&temp);

    ripple()
        .current_dir(temp.path())
        .arg("methods")
        .arg(universe.path())
        .arg("app.Handler#handle(List)")
        .arg("--single-file")
        .assert()
        .success()
        .stdout("app.Handler#handle(List)\n");
}

#[test]
fn unknown_method_fails_with_exit_code_2() {
    let temp = TempDir::new().unwrap();
    let universe = universe(&temp);

    ripple()
        .current_dir(temp.path())
        .arg("methods")
        .arg(universe.path())
        .arg("app.Handler#handle(int)")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no method `app.Handler#handle(int)`"));
}

#[test]
fn malformed_method_reference_fails() {
    let temp = TempDir::new().unwrap();
    let universe = universe(&temp);

    ripple()
        .current_dir(temp.path())
        .arg("methods")
        .arg(universe.path())
        .arg("app.Handler.handle()")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing `#`"));
}

#[test]
fn missing_universe_file_fails() {
    let temp = TempDir::new().unwrap();

    ripple()
        .current_dir(temp.path())
        .arg("methods")
        .arg(temp.path().join("absent.json"))
        .arg("app.Handler#handle(List)")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("loading universe"));
}

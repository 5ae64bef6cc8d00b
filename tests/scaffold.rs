// tests/scaffold.rs

use std::fs;

use luatask::errors::CaptureError;
use luatask::scaffold::{scaffold, ScaffoldOutcome, STARTER_SCRIPT};
use luatask::script::{Engine, EngineOptions};
use luatask_test_utils::init_tracing;

#[test]
fn creates_a_listable_starter_script() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.lua");

    assert_eq!(scaffold(&path).unwrap(), ScaffoldOutcome::Created(path.clone()));
    assert_eq!(fs::read_to_string(&path).unwrap(), STARTER_SCRIPT);

    let engine = Engine::compile(&path, EngineOptions::default()).unwrap();
    let registry = engine.list().unwrap();
    let default = &registry.get("default").unwrap().meta;

    assert_eq!(default.description, "Says \"Hello World\"");
    // `print` is gated while listing, so the body stops after its directive.
    assert!(matches!(default.capture_error, Some(CaptureError::Runtime(_))));

    engine.run("default").unwrap();
}

#[test]
fn never_overwrites_an_existing_script() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.lua");
    fs::write(&path, "-- mine\n").unwrap();

    assert_eq!(
        scaffold(&path).unwrap(),
        ScaffoldOutcome::AlreadyExists(path.clone())
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "-- mine\n");
}

// tests/compile.rs

use luatask::errors::CompileError;
use luatask::script::{compiler, Engine, EngineOptions};
use luatask_test_utils::{init_tracing, ScriptBuilder, ScriptFixture};

#[test]
fn missing_script_is_not_found() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.lua");

    match compiler::compile(&path) {
        Err(CompileError::NotFound { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn syntax_error_carries_location() {
    init_tracing();
    let fixture = ScriptFixture::new("function task.broken()\n  local x = = 1\nend\n");

    match compiler::compile(fixture.path()) {
        Err(CompileError::Syntax { location, message }) => {
            assert_eq!(location.line, Some(2));
            assert!(location.chunk.ends_with("tasks.lua"), "chunk was {}", location.chunk);
            assert!(!message.is_empty());
        }
        other => panic!("expected Syntax error, got {:?}", other),
    }
}

#[test]
fn compiling_does_not_run_the_script() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let flag = dir.path().join("flag.txt");
    let source = format!(
        "write_file({}, 'ran')\n",
        luatask_test_utils::lua_str(&flag.to_string_lossy())
    );

    let unit = compiler::compile_source(dir.path().join("tasks.lua"), &source).unwrap();

    assert!(!unit.bytecode().is_empty());
    assert!(!flag.exists());
}

#[test]
fn compiling_twice_harvests_identically() {
    init_tracing();
    let source = ScriptBuilder::new()
        .described_task("build", "Builds it", &["src/a.c", "src/b.c"])
        .described_task("test", "Tests it", &[])
        .task("plain", "local x = 1")
        .top_level("task.not_a_task = 42")
        .build();
    let fixture = ScriptFixture::new(&source);

    let first = fixture.engine().list().unwrap();
    let second = fixture.engine().list().unwrap();

    assert_eq!(first.sorted(), second.sorted());
    assert_eq!(first.len(), 3);
}

#[test]
fn engine_exposes_the_compiled_unit() {
    init_tracing();
    let fixture = ScriptFixture::new("function task.a() end\n");
    let engine = Engine::compile(fixture.path(), EngineOptions::default()).unwrap();

    assert_eq!(engine.unit().path(), fixture.path());
    assert!(engine.unit().chunk_name().ends_with("tasks.lua"));
}

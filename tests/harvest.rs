// tests/harvest.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use luatask::errors::{CaptureError, HarvestError};
use luatask::script::{EngineOptions, TaskMeta};
use luatask_test_utils::{init_tracing, ScriptBuilder, ScriptFixture};

fn meta<'a>(metas: &'a [&'a TaskMeta], name: &str) -> &'a TaskMeta {
    metas
        .iter()
        .find(|m| m.name == name)
        .copied()
        .unwrap_or_else(|| panic!("task {name} not harvested"))
}

#[test]
fn captures_description_and_sources() {
    init_tracing();
    let source = ScriptBuilder::new()
        .described_task("build", "x", &["a.txt", "b.txt"])
        .task("bare", "local unused = true")
        .build();
    let fixture = ScriptFixture::new(&source);

    let registry = fixture.engine().list().unwrap();
    let metas = registry.sorted();

    let build = meta(&metas, "build");
    assert_eq!(build.description, "x");
    assert_eq!(build.sources, vec!["a.txt", "b.txt"]);
    assert!(build.is_complete());

    let bare = meta(&metas, "bare");
    assert_eq!(bare.description, "");
    assert!(bare.sources.is_empty());
    assert!(bare.dependencies.is_empty());
}

#[test]
fn last_description_wins_and_sources_accumulate() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.multi()
  description "first"
  sources { "a" }
  description "second"
  sources { "b", "c" }
end
"#,
    );

    let registry = fixture.engine().list().unwrap();
    let multi = &registry.get("multi").unwrap().meta;

    assert_eq!(multi.description, "second");
    assert_eq!(multi.sources, vec!["a", "b", "c"]);
}

#[test]
fn depends_is_recorded_but_not_resolved() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.deploy()
  depends("build", "test")
  depends({ "does-not-exist" })
end
"#,
    );

    let registry = fixture.engine().list().unwrap();
    let deploy = &registry.get("deploy").unwrap().meta;

    assert_eq!(deploy.dependencies, vec!["build", "test", "does-not-exist"]);
    assert!(deploy.is_complete());
    assert_eq!(registry.len(), 1);
}

#[test]
fn defer_is_accepted_without_effect() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.cleanup()
  defer(function() error("never called") end)
  description "has a deferred step"
end
"#,
    );

    let registry = fixture.engine().list().unwrap();
    let cleanup = &registry.get("cleanup").unwrap().meta;

    assert_eq!(cleanup.description, "has a deferred step");
    assert!(cleanup.is_complete());
}

#[test]
fn bad_sources_fail_only_that_task() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.bad()
  description "before the failure"
  sources { "ok.txt", 42 }
  description "never reached"
end

function task.good()
  description "fine"
  sources { "good.txt" }
end
"#,
    );

    let registry = fixture.engine().list().unwrap();

    let bad = &registry.get("bad").unwrap().meta;
    assert_eq!(bad.description, "before the failure");
    assert_eq!(bad.sources, vec!["ok.txt"]);
    assert!(matches!(bad.capture_error, Some(CaptureError::Type(_))));

    let good = &registry.get("good").unwrap().meta;
    assert_eq!(good.description, "fine");
    assert_eq!(good.sources, vec!["good.txt"]);
    assert!(good.is_complete());
}

#[test]
fn sources_with_string_keys_is_a_type_error() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.keyed()
  sources { main = "main.c" }
end
"#,
    );

    let registry = fixture.engine().list().unwrap();
    let keyed = &registry.get("keyed").unwrap().meta;

    match &keyed.capture_error {
        Some(CaptureError::Type(message)) => assert!(message.contains("keys")),
        other => panic!("expected a type error, got {:?}", other),
    }
}

#[test]
fn sources_keeps_ascending_prefix_before_bad_value() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.sparse()
  sources { [3] = "c", [1] = "a", [2] = "b", [4] = false, [5] = "e" }
end
"#,
    );

    let registry = fixture.engine().list().unwrap();
    let sparse = &registry.get("sparse").unwrap().meta;

    assert_eq!(sparse.sources, vec!["a", "b", "c"]);
    match &sparse.capture_error {
        Some(CaptureError::Type(message)) => assert!(message.contains("values")),
        other => panic!("expected a type error, got {:?}", other),
    }
}

#[test]
fn numeric_description_is_coerced() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.numbered()
  description(42)
end

function task.flagged()
  description(true)
end
"#,
    );

    let registry = fixture.engine().list().unwrap();

    let numbered = &registry.get("numbered").unwrap().meta;
    assert_eq!(numbered.description, "42");
    assert!(numbered.is_complete());

    let flagged = &registry.get("flagged").unwrap().meta;
    assert!(matches!(flagged.capture_error, Some(CaptureError::Type(_))));
}

#[test]
fn only_string_keys_with_functions_become_tasks() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
task.version = "1.2.3"
task[1] = function() end
task.settings = { verbose = true }
function task.real() end
"#,
    );

    let registry = fixture.engine().list().unwrap();
    let names: Vec<&str> = registry.names().collect();

    assert_eq!(names, vec!["real"]);
}

#[test]
fn top_level_directive_calls_are_discarded() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
description "not a task"
sources { 1, 2, 3 }
function task.a() end
"#,
    );

    let registry = fixture.engine().list().unwrap();
    let a = &registry.get("a").unwrap().meta;

    assert_eq!(a.description, "");
    assert!(a.sources.is_empty());
    assert!(a.is_complete());
}

#[test]
fn runtime_error_in_task_keeps_partial_metadata() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.explodes()
  description "partial"
  error("boom")
end
"#,
    );

    let registry = fixture.engine().list().unwrap();
    let explodes = &registry.get("explodes").unwrap().meta;

    assert_eq!(explodes.description, "partial");
    match &explodes.capture_error {
        Some(CaptureError::Runtime(message)) => assert!(message.contains("boom")),
        other => panic!("expected a runtime error, got {:?}", other),
    }
}

#[test]
fn list_is_cached() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.count()
  description "counted"
end
"#,
    );
    let engine = fixture.engine();

    let first = engine.list().unwrap();
    let second = engine.list().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn endless_top_level_times_out() {
    init_tracing();
    let fixture = ScriptFixture::new("while true do end\n");
    let engine = fixture.engine_with(EngineOptions {
        harvest_timeout: Duration::from_millis(60),
        task_harvest_timeout: None,
    });

    let started = Instant::now();
    let result = engine.list();
    let elapsed = started.elapsed();

    assert_eq!(result.unwrap_err(), HarvestError::Timeout(Duration::from_millis(60)));
    assert!(elapsed < Duration::from_millis(200), "took {elapsed:?}");
}

#[test]
fn caught_deadline_at_top_level_still_times_out() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
pcall(function() while true do end end)
function task.a() end
"#,
    );
    let engine = fixture.engine_with(EngineOptions {
        harvest_timeout: Duration::from_millis(60),
        task_harvest_timeout: None,
    });

    assert_eq!(
        engine.list().unwrap_err(),
        HarvestError::Timeout(Duration::from_millis(60))
    );
}

#[test]
fn caught_deadline_in_task_body_still_marks_timeout() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.stubborn()
  pcall(function() while true do end end)
  description "after"
end
"#,
    );
    let engine = fixture.engine_with(EngineOptions {
        harvest_timeout: Duration::from_millis(60),
        task_harvest_timeout: Some(Duration::from_millis(30)),
    });

    let registry = engine.list().unwrap();
    let stubborn = &registry.get("stubborn").unwrap().meta;

    assert_eq!(
        stubborn.capture_error,
        Some(CaptureError::Timeout(Duration::from_millis(30)))
    );
}

#[test]
fn endless_task_body_only_fails_that_task() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.spin()
  description "spins"
  while true do end
end

function task.quick()
  description "quick"
end
"#,
    );
    let engine = fixture.engine_with(EngineOptions {
        harvest_timeout: Duration::from_millis(60),
        task_harvest_timeout: Some(Duration::from_millis(30)),
    });

    let registry = engine.list().unwrap();

    let spin = &registry.get("spin").unwrap().meta;
    assert_eq!(spin.description, "spins");
    assert_eq!(
        spin.capture_error,
        Some(CaptureError::Timeout(Duration::from_millis(30)))
    );
    assert!(registry.get("quick").unwrap().meta.is_complete());
}

#[test]
fn top_level_error_fails_the_harvest() {
    init_tracing();
    let fixture = ScriptFixture::new("error('bad setup')\n");

    match fixture.engine().list() {
        Err(HarvestError::Runtime(message)) => assert!(message.contains("bad setup")),
        other => panic!("expected a runtime harvest error, got {:?}", other),
    }
}

#[test]
fn replacing_the_task_table_fails_the_harvest() {
    init_tracing();
    let fixture = ScriptFixture::new("task = 5\n");

    assert_eq!(
        fixture.engine().list().unwrap_err(),
        HarvestError::TaskTable("integer".to_string())
    );
}

#[test]
fn gate_removes_host_capabilities_during_listing() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.inspect()
  local found = {}
  for _, name in ipairs({ "io", "print", "load", "require", "debug", "coroutine", "write_file", "sh" }) do
    if _G[name] ~= nil then table.insert(found, name) end
  end
  if os.execute ~= nil then table.insert(found, "os.execute") end
  if os.remove ~= nil then table.insert(found, "os.remove") end
  description(table.concat(found, ","))
end
"#,
    );

    let registry = fixture.engine().list().unwrap();
    let inspect = &registry.get("inspect").unwrap().meta;

    assert_eq!(inspect.description, "");
    assert!(inspect.is_complete());
}

#[test]
fn gated_task_that_writes_files_is_stopped() {
    init_tracing();
    let fixture = ScriptFixture::new("");
    let target = fixture.file("leak.txt");
    let source = format!(
        "function task.leak()\n  description 'leaks'\n  write_file({}, 'x')\nend\n",
        fixture.lua_path("leak.txt")
    );
    std::fs::write(fixture.path(), source).unwrap();

    let registry = fixture.engine().list().unwrap();
    let leak = &registry.get("leak").unwrap().meta;

    assert_eq!(leak.description, "leaks");
    assert!(matches!(leak.capture_error, Some(CaptureError::Runtime(_))));
    assert!(!target.exists());
}

// tests/report.rs

use std::path::{Path, PathBuf};

use luatask::errors::{CompileError, RunError, SourceLocation};
use luatask::exec::{QueueEvent, TaskOutcome};
use luatask::report;
use luatask_test_utils::{init_tracing, ScriptFixture};

#[test]
fn listing_is_sorted_and_marks_missing_descriptions() {
    init_tracing();
    let fixture = ScriptFixture::new(
        r#"
function task.zeta()
  description "last"
  sources { "z.txt", "y.txt" }
end
function task.alpha() end
function task.mid()
  depends("alpha")
  sources { 1 }
end
"#,
    );

    let registry = fixture.engine().list().unwrap();
    let listing = report::render_listing(&registry);
    let lines: Vec<&str> = listing.lines().collect();

    assert_eq!(lines[0], "luatask: all available tasks:");
    assert_eq!(lines[1], "- alpha (description not found)");
    assert_eq!(lines[2], "- mid (description not found)");
    assert_eq!(lines[3], "  depends: alpha");
    assert!(lines[4].starts_with("  (metadata may be incomplete: type error:"));
    assert_eq!(lines[5], "- zeta: last");
    assert_eq!(lines[6], "  tracks: z.txt, y.txt");
}

#[test]
fn empty_listing_says_so() {
    init_tracing();
    let fixture = ScriptFixture::new("-- nothing here\n");

    let registry = fixture.engine().list().unwrap();

    assert_eq!(
        report::render_listing(&registry),
        "luatask [error]: no tasks available"
    );
}

#[test]
fn compile_errors_are_phrased_per_kind() {
    let not_found = CompileError::NotFound {
        path: PathBuf::from("tasks.lua"),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    };
    let rendered = report::render_compile_error(&not_found, Path::new("/work"));
    assert!(rendered.contains("tasks.lua was not found in /work"));
    assert!(rendered.contains("--init"));

    let syntax = CompileError::Syntax {
        location: SourceLocation {
            chunk: "tasks.lua".to_string(),
            line: Some(7),
        },
        message: "unexpected symbol near '='".to_string(),
    };
    assert_eq!(
        report::render_compile_error(&syntax, Path::new("/work")),
        "luatask [error]: parse error:\ntasks.lua:7: unexpected symbol near '='"
    );
}

#[test]
fn queue_events_render_one_line_each() {
    let started = QueueEvent::Started {
        task: "build".to_string(),
        position: 1,
        total: 2,
    };
    assert_eq!(
        report::render_event(&started).unwrap(),
        "luatask: running build (1/2)"
    );

    let missing = QueueEvent::Finished {
        task: "nope".to_string(),
        outcome: TaskOutcome::Failed(RunError::NotFound("nope".to_string())),
    };
    assert_eq!(
        report::render_event(&missing).unwrap(),
        "luatask [error]: task nope not found"
    );
}

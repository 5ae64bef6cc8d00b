#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use luatask::script::{Engine, EngineOptions};
use tempfile::TempDir;

/// Quote `s` as a Lua string literal.
pub fn lua_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 32 || c as u32 == 127 => {
                out.push_str(&format!("\\{:03}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Builder for task-script source text.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    lines: Vec<String>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw top-level Lua.
    pub fn top_level(mut self, code: &str) -> Self {
        self.lines.push(code.to_string());
        self
    }

    /// `function task.<name>() <body> end`
    pub fn task(mut self, name: &str, body: &str) -> Self {
        self.lines
            .push(format!("task[{}] = function()\n{}\nend", lua_str(name), body));
        self
    }

    /// A task that only declares a description and sources.
    pub fn described_task(self, name: &str, description: &str, sources: &[&str]) -> Self {
        let sources = sources
            .iter()
            .map(|s| lua_str(s))
            .collect::<Vec<_>>()
            .join(", ");
        let body = format!(
            "  description({})\n  sources({{ {} }})",
            lua_str(description),
            sources
        );
        self.task(name, &body)
    }

    pub fn build(self) -> String {
        let mut source = self.lines.join("\n");
        source.push('\n');
        source
    }
}

/// A task script written into its own temporary directory.
pub struct ScriptFixture {
    dir: TempDir,
    path: PathBuf,
}

impl ScriptFixture {
    /// Write `source` as `tasks.lua` in a fresh temporary directory.
    pub fn new(source: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("tasks.lua");
        fs::write(&path, source).expect("write tasks.lua");
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `name` inside the fixture directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Same as [`ScriptFixture::file`], quoted for use inside Lua source.
    pub fn lua_path(&self, name: &str) -> String {
        lua_str(&self.file(name).to_string_lossy())
    }

    pub fn engine(&self) -> Engine {
        self.engine_with(EngineOptions::default())
    }

    pub fn engine_with(&self, options: EngineOptions) -> Engine {
        Engine::compile(&self.path, options).expect("fixture script compiles")
    }
}

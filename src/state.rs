//! Last-run persistence backing the `status` and `show` subcommands.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub detected: usize,
    pub survived: usize,
    pub errors: usize,
    pub unknown: usize,
    pub timeout: usize,
    pub excluded: usize,
    pub aborted: Option<String>,
    pub survived_mutants: Vec<StoredMutant>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredMutant {
    pub ref_id: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub original: String,
    pub replacement: String,
    pub diff: String,
}

fn state_path() -> PathBuf {
    let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    dir.join(".pymutest-state.json")
}

pub fn save_last_run(summary: &RunSummary) {
    save_to_path(summary, &state_path());
}

pub fn load_last_run() -> Option<RunSummary> {
    load_from_path(&state_path())
}

pub fn save_to_path(summary: &RunSummary, path: &std::path::Path) {
    if let Ok(json) = serde_json::to_string(summary) {
        let _ = std::fs::write(path, json);
    }
}

pub fn load_from_path(path: &std::path::Path) -> Option<RunSummary> {
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

//! Trial orchestration: write one mutant at a time, run the test command,
//! classify the outcome, and restore the original source.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{MutationError, Result};
use crate::mutants::{MutantDescriptor, TrialResult, TrialStatus};
use crate::safety;
use crate::walker::{self, SyntaxTree};

/// Settings for one batch of trials.
#[derive(Debug, Clone)]
pub struct TrialConfig {
    pub test_cmd: String,
    pub timeout: Duration,
    pub working_dir: PathBuf,
    pub parallel: bool,
}

/// Everything needed to run one file's trial queue.
#[derive(Debug)]
pub struct FileTrials {
    pub source_file: PathBuf,
    pub source: String,
    pub tree: SyntaxTree,
    pub mutants: Vec<MutantDescriptor>,
}

pub enum BaselineResult {
    Ok { duration: Duration },
    Failed(String),
}

pub fn parse_test_cmd(cmd: &str) -> (String, Vec<String>) {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    if parts.len() > 1 {
        (
            parts[0].to_string(),
            parts[1..].iter().map(|s| s.to_string()).collect(),
        )
    } else {
        (cmd.to_string(), vec![])
    }
}

/// Run the test command once against unmutated source. Trials are
/// pointless if the suite already fails.
pub fn run_baseline(cfg: &TrialConfig) -> BaselineResult {
    let start = Instant::now();
    let (program, args) = parse_test_cmd(&cfg.test_cmd);
    let output = Command::new(&program)
        .args(&args)
        .current_dir(&cfg.working_dir)
        .output();

    match output {
        Ok(o) => {
            if o.status.success() {
                BaselineResult::Ok {
                    duration: start.elapsed(),
                }
            } else {
                let stdout = String::from_utf8_lossy(&o.stdout).to_string();
                let stderr = String::from_utf8_lossy(&o.stderr).to_string();
                BaselineResult::Failed(format!("{}\n{}", stdout, stderr))
            }
        }
        Err(e) => BaselineResult::Failed(format!("Failed to run {}: {}", cfg.test_cmd, e)),
    }
}

/// Map a test-command exit to a trial status with pytest semantics:
/// 0 all passed, 1 tests failed, 2 interrupted, 3 internal error,
/// 4 usage error. Signal death and anything else is unclassifiable.
pub fn classify_exit(code: Option<i32>, timed_out: bool) -> (TrialStatus, i32) {
    if timed_out {
        return (TrialStatus::Timeout, -1);
    }
    match code {
        Some(0) => (TrialStatus::Survived, 0),
        Some(1) => (TrialStatus::Detected, 1),
        Some(c @ 2..=4) => (TrialStatus::Error, c),
        Some(c) => (TrialStatus::Unknown, c),
        None => (TrialStatus::Unknown, -1),
    }
}

struct ExitOutcome {
    code: Option<i32>,
    timed_out: bool,
}

fn run_test_command(cfg: &TrialConfig) -> std::io::Result<ExitOutcome> {
    let (program, args) = parse_test_cmd(&cfg.test_cmd);
    let mut child = Command::new(&program)
        .args(&args)
        .current_dir(&cfg.working_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(ExitOutcome {
                    code: status.code(),
                    timed_out: false,
                });
            }
            Ok(None) => {
                if start.elapsed() > cfg.timeout {
                    // Kill and reap before the file lock is released.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(ExitOutcome {
                        code: None,
                        timed_out: true,
                    });
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        }
    }
}

/// Holds a file's pre-trial bytes and restores them on every exit path.
/// The happy path calls `restore()` so a write failure surfaces as
/// `RestoreFailure`; `Drop` is the net for panics and early returns.
struct SourceGuard<'a> {
    path: &'a Path,
    original: &'a str,
    restored: bool,
}

impl<'a> SourceGuard<'a> {
    fn new(path: &'a Path, original: &'a str) -> Self {
        SourceGuard {
            path,
            original,
            restored: false,
        }
    }

    fn restore(mut self) -> Result<()> {
        self.restored = true;
        std::fs::write(self.path, self.original).map_err(|e| MutationError::RestoreFailure {
            file: self.path.to_path_buf(),
            source: e,
        })?;
        clear_pycache(self.path);
        Ok(())
    }
}

impl Drop for SourceGuard<'_> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        match std::fs::write(self.path, self.original) {
            Ok(()) => clear_pycache(self.path),
            Err(_) => eprintln!(
                "FATAL: could not restore {}; recover it manually from {}",
                self.path.display(),
                safety::backup_path(self.path).display()
            ),
        }
    }
}

/// Remove cached bytecode for a source file so the interpreter re-reads
/// the .py on next import. CPython validates a .pyc by source mtime and
/// size, so a same-length mutant written and restored within one timestamp
/// tick would otherwise leave stale mutated bytecode for later trials.
pub fn clear_pycache(source_file: &Path) {
    let Some(parent) = source_file.parent() else {
        return;
    };
    let Some(stem) = source_file.file_stem() else {
        return;
    };
    let Ok(entries) = std::fs::read_dir(parent.join("__pycache__")) else {
        return;
    };
    let stem = stem.to_string_lossy();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&*stem) && name.ends_with(".pyc") {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// Run a single trial: write the mutant, run the tests, classify, restore.
/// Per-mutant failures become a `TrialResult`; only a restore failure is
/// returned as an error.
pub fn run_trial(
    source: &str,
    tree: &SyntaxTree,
    mutant: &MutantDescriptor,
    cfg: &TrialConfig,
) -> Result<TrialResult> {
    let applied = match walker::apply(&mutant.source_file, tree, &mutant.location, mutant.replacement)
    {
        Ok(a) => a,
        Err(MutationError::TargetNotFound { .. }) => {
            // Discovery and apply disagree; fail this trial, not the batch.
            return Ok(TrialResult {
                mutant: mutant.clone(),
                status: TrialStatus::Error,
                return_code: -1,
            });
        }
        Err(e) => return Err(e),
    };
    let mutated = walker::render(source, &applied);

    let guard = SourceGuard::new(&mutant.source_file, source);
    let result = match std::fs::write(&mutant.source_file, &mutated) {
        Ok(()) => {
            clear_pycache(&mutant.source_file);
            match run_test_command(cfg) {
                Ok(outcome) => {
                    let (status, return_code) = classify_exit(outcome.code, outcome.timed_out);
                    TrialResult {
                        mutant: mutant.clone(),
                        status,
                        return_code,
                    }
                }
                // The command itself could not run at all.
                Err(_) => TrialResult {
                    mutant: mutant.clone(),
                    status: TrialStatus::Error,
                    return_code: -1,
                },
            }
        }
        Err(_) => TrialResult {
            mutant: mutant.clone(),
            status: TrialStatus::Error,
            return_code: -1,
        },
    };
    guard.restore()?;
    Ok(result)
}

/// Run one file's queue in order. The thread owning a `FileTrials` is the
/// only writer of that file, which is what makes parallel batches safe.
fn run_file(file: &FileTrials, cfg: &TrialConfig, results: &Mutex<Vec<TrialResult>>) -> Result<()> {
    safety::write_backup(&file.source_file, &file.source)?;
    for mutant in &file.mutants {
        let result = run_trial(&file.source, &file.tree, mutant, cfg)?;
        results.lock().unwrap().push(result);
    }
    // On a fatal error the backup stays behind for recovery.
    safety::remove_backup(&file.source_file);
    Ok(())
}

/// Run every file's trial queue. Trials for one file never overlap;
/// distinct files run concurrently when `cfg.parallel` is set. On a fatal
/// error the results captured so far are still returned.
pub fn run_batch(
    files: &[FileTrials],
    cfg: &TrialConfig,
) -> (Vec<TrialResult>, Option<MutationError>) {
    let results = Mutex::new(Vec::new());
    let fatal: Mutex<Option<MutationError>> = Mutex::new(None);

    if cfg.parallel {
        std::thread::scope(|scope| {
            for file in files {
                let results = &results;
                let fatal = &fatal;
                scope.spawn(move || {
                    if let Err(e) = run_file(file, cfg, results) {
                        *fatal.lock().unwrap() = Some(e);
                    }
                });
            }
        });
    } else {
        for file in files {
            if let Err(e) = run_file(file, cfg, &results) {
                *fatal.lock().unwrap() = Some(e);
                break;
            }
        }
    }

    (results.into_inner().unwrap(), fatal.into_inner().unwrap())
}

/// Deterministically sample at most `n` mutants with a seeded shuffle.
pub fn sample_mutants(mutants: &mut Vec<MutantDescriptor>, n: usize, seed: Option<u64>) {
    if mutants.len() <= n {
        return;
    }
    let mut rng = match seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    };
    rng.shuffle(mutants);
    mutants.truncate(n);
}

/// Diff of original vs. mutated source for one mutant, rendered as
/// `-`/`+` lines.
pub fn mutant_diff(source: &str, tree: &SyntaxTree, mutant: &MutantDescriptor) -> Result<String> {
    let applied = walker::apply(&mutant.source_file, tree, &mutant.location, mutant.replacement)?;
    let mutated = walker::render(source, &applied);
    Ok(generate_diff(source, &mutated))
}

pub fn generate_diff(original: &str, mutated: &str) -> String {
    use similar::TextDiff;
    let diff = TextDiff::from_lines(original, mutated);
    let mut output = String::new();
    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => {
                output.push_str(&format!("- {}", change));
            }
            similar::ChangeTag::Insert => {
                output.push_str(&format!("+ {}", change));
            }
            _ => {}
        }
    }
    output
}

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use pymutest::mutants::{MutantDescriptor, TrialStatus};
use pymutest::runner::{self, FileTrials, TrialConfig};
use pymutest::walker;

const SOURCE: &str = "def add(a, b):\n    return a + b\n";

fn config(test_cmd: &str, dir: &Path) -> TrialConfig {
    TrialConfig {
        test_cmd: test_cmd.to_string(),
        timeout: Duration::from_secs(10),
        working_dir: dir.to_path_buf(),
        parallel: false,
    }
}

fn setup(dir: &Path, name: &str) -> (PathBuf, walker::SyntaxTree, Vec<MutantDescriptor>) {
    let path = dir.join(name);
    std::fs::write(&path, SOURCE).unwrap();
    let tree = walker::parse_source(&path, SOURCE).unwrap();
    let mutants = walker::expand_mutants(&path, &tree);
    (path, tree, mutants)
}

// --- classify_exit ---

#[test]
fn exit_zero_is_survived() {
    assert_eq!(runner::classify_exit(Some(0), false), (TrialStatus::Survived, 0));
}

#[test]
fn exit_one_is_detected() {
    assert_eq!(runner::classify_exit(Some(1), false), (TrialStatus::Detected, 1));
}

#[test]
fn pytest_internal_exits_are_errors() {
    for code in 2..=4 {
        assert_eq!(
            runner::classify_exit(Some(code), false),
            (TrialStatus::Error, code)
        );
    }
}

#[test]
fn timeout_wins_over_exit_code() {
    assert_eq!(runner::classify_exit(Some(0), true), (TrialStatus::Timeout, -1));
}

#[test]
fn signal_death_is_unknown() {
    assert_eq!(runner::classify_exit(None, false), (TrialStatus::Unknown, -1));
}

#[test]
fn unexpected_exit_code_is_unknown() {
    assert_eq!(runner::classify_exit(Some(77), false), (TrialStatus::Unknown, 77));
}

// --- parse_test_cmd ---

#[test]
fn parse_test_cmd_single_word() {
    let (program, args) = runner::parse_test_cmd("pytest");
    assert_eq!(program, "pytest");
    assert!(args.is_empty());
}

#[test]
fn parse_test_cmd_with_args() {
    let (program, args) = runner::parse_test_cmd("pytest -x -q");
    assert_eq!(program, "pytest");
    assert_eq!(args, vec!["-x", "-q"]);
}

// --- run_trial ---

#[test]
fn passing_suite_means_survived_and_file_restored() {
    let dir = tempfile::tempdir().unwrap();
    let (path, tree, mutants) = setup(dir.path(), "target.py");
    let cfg = config("true", dir.path());

    let result = runner::run_trial(SOURCE, &tree, &mutants[0], &cfg).unwrap();

    assert_eq!(result.status, TrialStatus::Survived);
    assert_eq!(result.return_code, 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SOURCE);
}

#[test]
fn failing_suite_means_detected_and_file_restored() {
    let dir = tempfile::tempdir().unwrap();
    let (path, tree, mutants) = setup(dir.path(), "target.py");
    let cfg = config("false", dir.path());

    let result = runner::run_trial(SOURCE, &tree, &mutants[0], &cfg).unwrap();

    assert_eq!(result.status, TrialStatus::Detected);
    assert_eq!(result.return_code, 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SOURCE);
}

#[test]
fn slow_suite_times_out_and_file_restored() {
    let dir = tempfile::tempdir().unwrap();
    let (path, tree, mutants) = setup(dir.path(), "target.py");
    let mut cfg = config("sleep 30", dir.path());
    cfg.timeout = Duration::from_millis(200);

    let start = Instant::now();
    let result = runner::run_trial(SOURCE, &tree, &mutants[0], &cfg).unwrap();

    assert_eq!(result.status, TrialStatus::Timeout);
    // The child must have been killed, not waited out.
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SOURCE);
}

#[test]
fn unspawnable_command_is_an_error_and_file_restored() {
    let dir = tempfile::tempdir().unwrap();
    let (path, tree, mutants) = setup(dir.path(), "target.py");
    let cfg = config("definitely-not-a-real-command-xyz", dir.path());

    let result = runner::run_trial(SOURCE, &tree, &mutants[0], &cfg).unwrap();

    assert_eq!(result.status, TrialStatus::Error);
    assert_eq!(result.return_code, -1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SOURCE);
}

#[test]
fn stale_descriptor_fails_the_trial_without_running_tests() {
    let dir = tempfile::tempdir().unwrap();
    let (path, tree, mut mutants) = setup(dir.path(), "target.py");
    mutants[0].location.line = 99;
    let cfg = config("true", dir.path());

    let result = runner::run_trial(SOURCE, &tree, &mutants[0], &cfg).unwrap();

    assert_eq!(result.status, TrialStatus::Error);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SOURCE);
}

#[test]
fn mutant_is_on_disk_while_the_suite_runs() {
    let dir = tempfile::tempdir().unwrap();
    let (path, tree, mutants) = setup(dir.path(), "target.py");
    // The "suite" snapshots the mutated source so we can observe it.
    let probe = dir.path().join("probe.txt");
    let cfg = config(
        &format!("cp {} {}", path.display(), probe.display()),
        dir.path(),
    );

    let result = runner::run_trial(SOURCE, &tree, &mutants[0], &cfg).unwrap();

    assert_eq!(result.status, TrialStatus::Survived);
    let seen = std::fs::read_to_string(&probe).unwrap();
    assert_ne!(seen, SOURCE);
    assert!(seen.contains(mutants[0].replacement.token()));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SOURCE);
}

#[test]
fn trial_clears_cached_bytecode_for_the_mutated_file() {
    let dir = tempfile::tempdir().unwrap();
    let (_, tree, mutants) = setup(dir.path(), "target.py");
    // A .pyc validated by mtime+size would survive a same-length mutant
    // write and restore, leaking one trial's state into the next.
    let cache_dir = dir.path().join("__pycache__");
    std::fs::create_dir(&cache_dir).unwrap();
    let pyc = cache_dir.join("target.cpython-311.pyc");
    let other = cache_dir.join("helper.cpython-311.pyc");
    std::fs::write(&pyc, b"stale").unwrap();
    std::fs::write(&other, b"unrelated").unwrap();
    let cfg = config("true", dir.path());

    runner::run_trial(SOURCE, &tree, &mutants[0], &cfg).unwrap();

    assert!(!pyc.exists());
    assert!(other.exists());
}

// --- run_batch ---

#[test]
fn batch_produces_one_result_per_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let (path, tree, mutants) = setup(dir.path(), "target.py");
    let total = mutants.len();
    let files = vec![FileTrials {
        source_file: path.clone(),
        source: SOURCE.to_string(),
        tree,
        mutants,
    }];
    let cfg = config("false", dir.path());

    let (results, fatal) = runner::run_batch(&files, &cfg);

    assert!(fatal.is_none());
    assert_eq!(results.len(), total);
    assert!(results.iter().all(|r| r.status == TrialStatus::Detected));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SOURCE);
}

#[test]
fn parallel_batch_restores_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let (path_a, tree_a, mutants_a) = setup(dir.path(), "alpha.py");
    let (path_b, tree_b, mutants_b) = setup(dir.path(), "beta.py");
    let total = mutants_a.len() + mutants_b.len();
    let files = vec![
        FileTrials {
            source_file: path_a.clone(),
            source: SOURCE.to_string(),
            tree: tree_a,
            mutants: mutants_a,
        },
        FileTrials {
            source_file: path_b.clone(),
            source: SOURCE.to_string(),
            tree: tree_b,
            mutants: mutants_b,
        },
    ];
    let mut cfg = config("true", dir.path());
    cfg.parallel = true;

    let (results, fatal) = runner::run_batch(&files, &cfg);

    assert!(fatal.is_none());
    assert_eq!(results.len(), total);
    assert_eq!(std::fs::read_to_string(&path_a).unwrap(), SOURCE);
    assert_eq!(std::fs::read_to_string(&path_b).unwrap(), SOURCE);
}

#[test]
fn batch_removes_backups_on_completion() {
    let dir = tempfile::tempdir().unwrap();
    let (path, tree, mutants) = setup(dir.path(), "target.py");
    let files = vec![FileTrials {
        source_file: path.clone(),
        source: SOURCE.to_string(),
        tree,
        mutants,
    }];
    let cfg = config("true", dir.path());

    runner::run_batch(&files, &cfg);

    assert!(pymutest::safety::check_interrupted_run(&path).is_none());
}

// --- baseline ---

#[test]
fn baseline_passes_with_green_suite() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config("true", dir.path());
    assert!(matches!(
        runner::run_baseline(&cfg),
        runner::BaselineResult::Ok { .. }
    ));
}

#[test]
fn baseline_fails_with_red_suite() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config("false", dir.path());
    assert!(matches!(
        runner::run_baseline(&cfg),
        runner::BaselineResult::Failed(_)
    ));
}

// --- sample_mutants ---

#[test]
fn sampling_truncates_to_requested_size() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, mut mutants) = setup(dir.path(), "target.py");
    runner::sample_mutants(&mut mutants, 3, Some(42));
    assert_eq!(mutants.len(), 3);
}

#[test]
fn sampling_is_deterministic_for_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, mutants) = setup(dir.path(), "target.py");

    let mut first = mutants.clone();
    let mut second = mutants;
    runner::sample_mutants(&mut first, 4, Some(7));
    runner::sample_mutants(&mut second, 4, Some(7));

    assert_eq!(first, second);
}

#[test]
fn sampling_is_a_no_op_when_already_small_enough() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, mut mutants) = setup(dir.path(), "target.py");
    let before = mutants.clone();
    runner::sample_mutants(&mut mutants, 1000, Some(1));
    assert_eq!(mutants, before);
}

// --- diffs ---

#[test]
fn mutant_diff_shows_the_operator_substitution() {
    let dir = tempfile::tempdir().unwrap();
    let (_, tree, mutants) = setup(dir.path(), "target.py");

    let diff = runner::mutant_diff(SOURCE, &tree, &mutants[0]).unwrap();

    assert!(diff.contains("-     return a + b"));
    assert!(diff.contains(&format!(
        "+     return a {} b",
        mutants[0].replacement.token()
    )));
}

#[test]
fn generate_diff_identical_returns_empty() {
    assert!(runner::generate_diff("same\n", "same\n").is_empty());
}

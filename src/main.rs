use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use pymutest::coverage::CoverageMap;
use pymutest::mutants::{MutantDescriptor, TrialResult, TrialStatus};
use pymutest::{output, report, runner, safety, state, walker};

#[derive(Parser)]
#[command(name = "pymutest", version, about = "Mutation testing for Python test suites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run mutation trials against one or more source files
    Run {
        /// Python source files to mutate
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Test command run once per trial
        #[arg(long, default_value = "pytest -x -q")]
        test_cmd: String,
        /// Per-trial timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
        /// Randomly sample at most N mutants
        #[arg(short = 'n', long)]
        sample: Option<usize>,
        /// RNG seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
        /// JSON coverage map of exercised lines: {"file.py": [1, 2, 6]}
        #[arg(long)]
        coverage: Option<PathBuf>,
        /// Run distinct files' trials concurrently
        #[arg(long)]
        parallel: bool,
        /// Skip the baseline run of the unmutated suite
        #[arg(long)]
        skip_baseline: bool,
        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
        /// Exit code only, no output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show details for a survived mutant by ref
    Show {
        /// Mutant ref (e.g. @m1 or m1)
        #[arg(name = "ref")]
        mutant_ref: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Summary of the last run
    Status {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Run {
            files,
            test_cmd,
            timeout,
            sample,
            seed,
            coverage,
            parallel,
            skip_baseline,
            json,
            quiet,
        } => cmd_run(RunArgs {
            files,
            test_cmd,
            timeout,
            sample,
            seed,
            coverage,
            parallel,
            skip_baseline,
            json,
            quiet,
        }),
        Commands::Show { mutant_ref, json } => cmd_show(mutant_ref, json),
        Commands::Status { json } => cmd_status(json),
    };

    process::exit(exit_code);
}

struct RunArgs {
    files: Vec<PathBuf>,
    test_cmd: String,
    timeout: u64,
    sample: Option<usize>,
    seed: Option<u64>,
    coverage: Option<PathBuf>,
    parallel: bool,
    skip_baseline: bool,
    json: bool,
    quiet: bool,
}

fn cmd_run(args: RunArgs) -> i32 {
    // Recover any file a previous run left mutated on disk.
    for file in &args.files {
        if let Some(bak) = safety::check_interrupted_run(file) {
            if safety::restore_from_backup(file, &bak).is_ok() {
                output::print_error(&format!(
                    "Recovered {} from a previously interrupted run. Re-run to continue.",
                    file.display()
                ));
                return 3;
            }
            output::print_error(&format!(
                "Stale backup {} exists but could not be restored.",
                bak.display()
            ));
            return 3;
        }
    }

    let mut loaded: Vec<runner::FileTrials> = Vec::new();
    let mut all_mutants: Vec<MutantDescriptor> = Vec::new();
    for file in &args.files {
        if !file.exists() {
            output::print_error(&format!(
                "Source file not found: {}. Check the path and try again.",
                file.display()
            ));
            return 2;
        }
        let source = match std::fs::read_to_string(file) {
            Ok(s) => s,
            Err(e) => {
                output::print_error(&format!("Failed to read {}: {}", file.display(), e));
                return 3;
            }
        };
        let tree = match walker::parse_source(file, &source) {
            Ok(t) => t,
            Err(e) => {
                output::print_error(&e.to_string());
                return 3;
            }
        };
        all_mutants.extend(walker::expand_mutants(file, &tree));
        loaded.push(runner::FileTrials {
            source_file: file.clone(),
            source,
            tree,
            mutants: Vec::new(),
        });
    }

    let excluded = match &args.coverage {
        Some(path) => {
            let map = match CoverageMap::load(path) {
                Ok(m) => m,
                Err(e) => {
                    output::print_error(&e.to_string());
                    return 2;
                }
            };
            let (kept, excluded) = map.partition(all_mutants);
            all_mutants = kept;
            excluded
        }
        None => Vec::new(),
    };

    if let Some(n) = args.sample {
        runner::sample_mutants(&mut all_mutants, n, args.seed);
    }

    if all_mutants.is_empty() && excluded.is_empty() {
        if !args.quiet {
            output::print_success("No mutable code found.");
        }
        return 0;
    }

    let cfg = runner::TrialConfig {
        test_cmd: args.test_cmd,
        timeout: Duration::from_secs(args.timeout),
        working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        parallel: args.parallel,
    };

    if !args.skip_baseline {
        match runner::run_baseline(&cfg) {
            runner::BaselineResult::Ok { .. } => {}
            runner::BaselineResult::Failed(detail) => {
                output::print_error(&format!(
                    "Tests fail before mutation. Fix failing tests first.\n{}",
                    detail
                ));
                return 3;
            }
        }
    }

    for trials in &mut loaded {
        trials.mutants = all_mutants
            .iter()
            .filter(|m| m.source_file == trials.source_file)
            .cloned()
            .collect();
    }

    let (results, fatal) = runner::run_batch(&loaded, &cfg);
    let aborted = fatal.map(|e| e.to_string());

    let summary = build_summary(&results, &excluded, aborted.clone(), &loaded);
    state::save_last_run(&summary);

    if args.quiet {
        return exit_code(&summary);
    }

    if args.json {
        println!("{}", serde_json::to_string(&summary).unwrap());
    } else {
        println!(
            "{}",
            report::render_report(&results, &excluded, aborted.as_deref())
        );
        println!();
        output::print_run_summary(&summary);
    }

    exit_code(&summary)
}

fn exit_code(summary: &state::RunSummary) -> i32 {
    if summary.aborted.is_some() {
        3
    } else if summary.survived > 0 {
        1
    } else {
        0
    }
}

fn build_summary(
    results: &[TrialResult],
    excluded: &[MutantDescriptor],
    aborted: Option<String>,
    loaded: &[runner::FileTrials],
) -> state::RunSummary {
    let count = |status: TrialStatus| results.iter().filter(|r| r.status == status).count();

    let survived_mutants: Vec<state::StoredMutant> = results
        .iter()
        .filter(|r| r.status == TrialStatus::Survived)
        .enumerate()
        .map(|(i, r)| {
            let m = &r.mutant;
            let diff = loaded
                .iter()
                .find(|t| t.source_file == m.source_file)
                .and_then(|t| runner::mutant_diff(&t.source, &t.tree, m).ok())
                .unwrap_or_default();
            state::StoredMutant {
                ref_id: format!("m{}", i + 1),
                file: m.source_file.display().to_string(),
                line: m.location.line,
                column: m.location.column,
                original: m.location.original.to_string(),
                replacement: m.replacement.to_string(),
                diff,
            }
        })
        .collect();

    state::RunSummary {
        total: results.len(),
        detected: count(TrialStatus::Detected),
        survived: survived_mutants.len(),
        errors: count(TrialStatus::Error),
        unknown: count(TrialStatus::Unknown),
        timeout: count(TrialStatus::Timeout),
        excluded: excluded.len(),
        aborted,
        survived_mutants,
    }
}

fn cmd_show(mutant_ref: String, json_mode: bool) -> i32 {
    let ref_id = mutant_ref.trim_start_matches('@');

    let last_run = match state::load_last_run() {
        Some(r) => r,
        None => {
            output::print_error("No previous run found. Run `pymutest run` first.");
            return 2;
        }
    };

    let mutant = last_run.survived_mutants.iter().find(|m| m.ref_id == ref_id);
    match mutant {
        Some(m) => {
            if json_mode {
                println!("{}", serde_json::to_string(m).unwrap());
            } else {
                output::print_mutant_detail(m);
            }
            0
        }
        None => {
            let valid: Vec<_> = last_run
                .survived_mutants
                .iter()
                .map(|m| format!("@{}", m.ref_id))
                .collect();
            output::print_error(&format!(
                "Mutant @{} not found. Valid refs: {}",
                ref_id,
                valid.join(", ")
            ));
            2
        }
    }
}

fn cmd_status(json_mode: bool) -> i32 {
    match state::load_last_run() {
        Some(summary) => {
            if json_mode {
                println!("{}", serde_json::to_string(&summary).unwrap());
            } else {
                output::print_status(&summary);
            }
            0
        }
        None => {
            output::print_error("No previous run found. Run `pymutest run` first.");
            2
        }
    }
}

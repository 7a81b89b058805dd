//! Results analysis and plain-text report creation.
//!
//! The report layout:
//!
//! ```text
//! Overall mutation trial summary
//! ==============================
//! SURVIVED: y
//! DETECTED: x
//! TOTAL RUNS: n
//!
//! Breakdown by section
//! ====================
//!
//! SURVIVED
//! --------
//! app.py: (l: 6, c: 11) - mutation from + to **
//! ```

use crate::mutants::{MutantDescriptor, TrialResult, TrialStatus};

/// Fixed render order for summary counts and breakdown sections, so
/// reports stay diffable across runs.
pub const STATUS_ORDER: [TrialStatus; 5] = [
    TrialStatus::Survived,
    TrialStatus::Detected,
    TrialStatus::Error,
    TrialStatus::Unknown,
    TrialStatus::Timeout,
];

/// Pairs a status with the mutants that finished with it, in encounter
/// order. Built only for reporting.
pub struct ReportedMutants<'a> {
    pub status: TrialStatus,
    pub mutants: Vec<&'a MutantDescriptor>,
}

pub fn reported_results(results: &[TrialResult], status: TrialStatus) -> ReportedMutants<'_> {
    ReportedMutants {
        status,
        mutants: results
            .iter()
            .filter(|r| r.status == status)
            .map(|r| &r.mutant)
            .collect(),
    }
}

/// Per-status counts as an explicit fold in `STATUS_ORDER`, zero counts
/// dropped. The summary total always equals the input length.
pub fn status_counts(results: &[TrialResult]) -> Vec<(TrialStatus, usize)> {
    STATUS_ORDER
        .iter()
        .map(|s| (*s, results.iter().filter(|r| r.status == *s).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// Create the analysis text report for a set of completed trials.
pub fn analyze_mutant_trials(results: &[TrialResult]) -> String {
    let mut report_sections = Vec::new();

    let summary_header = "Overall mutation trial summary";
    report_sections.push(format!("{}\n{}", summary_header, "=".repeat(summary_header.len())));
    for (status, n) in status_counts(results) {
        report_sections.push(format!("{}: {}", status.label(), n));
    }
    report_sections.push(format!("TOTAL RUNS: {}", results.len()));

    let section_header = "Breakdown by section";
    report_sections.push(format!(
        "\n\n{}\n{}",
        section_header,
        "=".repeat(section_header.len())
    ));
    for status in STATUS_ORDER {
        let group = reported_results(results, status);
        if !group.mutants.is_empty() {
            report_sections.push(build_report_section(group.status.label(), &group.mutants));
        }
    }

    report_sections.join("\n")
}

/// One labeled section listing each mutant's file, position, and the
/// operator substitution.
pub fn build_report_section(title: &str, mutants: &[&MutantDescriptor]) -> String {
    let mut lines = vec![String::new(), title.to_string(), "-".repeat(title.len())];
    for m in mutants {
        lines.push(format!(
            "{}: (l: {}, c: {}) - mutation from {} to {}",
            m.source_file.display(),
            m.location.line,
            m.location.column,
            m.location.original,
            m.replacement,
        ));
    }
    lines.join("\n")
}

/// Full report: core analysis plus the excluded-by-coverage bucket and an
/// aborted-run note when the batch ended early.
pub fn render_report(
    results: &[TrialResult],
    excluded: &[MutantDescriptor],
    aborted: Option<&str>,
) -> String {
    let mut out = analyze_mutant_trials(results);
    if !excluded.is_empty() {
        let refs: Vec<&MutantDescriptor> = excluded.iter().collect();
        out.push('\n');
        out.push_str(&build_report_section("EXCLUDED BY COVERAGE", &refs));
    }
    if let Some(reason) = aborted {
        out.push_str(&format!("\n\nRUN ABORTED: {}", reason));
    }
    out
}

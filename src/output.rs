use console::Style;

use crate::state::{RunSummary, StoredMutant};

pub fn print_error(msg: &str) {
    let style = Style::new().red().bold();
    eprintln!("{} {}", style.apply_to("✗"), msg);
}

pub fn print_success(msg: &str) {
    let style = Style::new().green().bold();
    println!("{} {}", style.apply_to("✓"), msg);
}

pub fn print_run_summary(summary: &RunSummary) {
    if summary.survived == 0 && summary.aborted.is_none() {
        let style = Style::new().green().bold();
        println!(
            "{} {} trials, no survivors ({} detected)",
            style.apply_to("✓"),
            summary.total,
            summary.detected,
        );
        return;
    }

    let style = Style::new().yellow().bold();
    println!(
        "{} {} survived / {} trials ({} detected)",
        style.apply_to("!"),
        summary.survived,
        summary.total,
        summary.detected,
    );

    let dim = Style::new().dim();
    if summary.errors > 0 {
        println!("  {} {} trials errored", dim.apply_to("·"), summary.errors);
    }
    if summary.unknown > 0 {
        println!("  {} {} trials unclassifiable", dim.apply_to("·"), summary.unknown);
    }
    if summary.timeout > 0 {
        println!("  {} {} trials timed out", dim.apply_to("·"), summary.timeout);
    }
    if summary.excluded > 0 {
        println!(
            "  {} {} mutants excluded by coverage",
            dim.apply_to("·"),
            summary.excluded
        );
    }
    if let Some(reason) = &summary.aborted {
        let err = Style::new().red().bold();
        println!("  {} run aborted: {}", err.apply_to("✗"), reason);
    }

    if !summary.survived_mutants.is_empty() {
        println!();
        for m in &summary.survived_mutants {
            let ref_style = Style::new().cyan().bold();
            let op_style = Style::new().magenta();
            println!(
                "  {} {}:{} {} → {}",
                ref_style.apply_to(format!("@{}", m.ref_id)),
                m.file,
                m.line,
                op_style.apply_to(&m.original),
                op_style.apply_to(&m.replacement),
            );
        }
    }
}

pub fn print_mutant_detail(m: &StoredMutant) {
    let ref_style = Style::new().cyan().bold();
    println!(
        "{} {}:{} (c: {}) {} → {}",
        ref_style.apply_to(format!("@{}", m.ref_id)),
        m.file,
        m.line,
        m.column,
        m.original,
        m.replacement,
    );
    println!();

    for line in m.diff.lines() {
        if line.starts_with('-') {
            let del_style = Style::new().red();
            println!("  {}", del_style.apply_to(line));
        } else if line.starts_with('+') {
            let add_style = Style::new().green();
            println!("  {}", add_style.apply_to(line));
        }
    }
}

pub fn print_status(summary: &RunSummary) {
    println!(
        "Last run: {} trials, {} detected, {} survived",
        summary.total, summary.detected, summary.survived,
    );

    if summary.survived > 0 {
        println!();
        for m in &summary.survived_mutants {
            let ref_style = Style::new().cyan().bold();
            println!(
                "  {} {}:{} {} → {}",
                ref_style.apply_to(format!("@{}", m.ref_id)),
                m.file,
                m.line,
                m.original,
                m.replacement,
            );
        }
        println!();
        println!("Use `pymutest show @m1` for details on a specific mutant.");
    }
}

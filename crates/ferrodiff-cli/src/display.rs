//! Console output for ferrodiff reports

use console::style;
use ferrodiff_index::DirectoryIndex;
use ferrodiff_sync::{
    DiffResult, DuplicateGroup, DuplicateSummary, ExecutionObserver, ExecutionReport,
    FileComparison, LinkAction, LinkReport, SyncAction,
};
use ferrodiff_types::Error;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Spinner shown while trees are scanned
pub fn create_scan_spinner(quiet: bool, message: &str) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Render a list of paths as `[a, b, c]`
pub fn format_path_list(paths: &[PathBuf]) -> String {
    let joined = paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// One-line description of what differs in a modified file
pub fn describe_comparison(comparison: &FileComparison) -> String {
    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
    let mut line = format!(
        "Hash: {}, Size: {}, Date: {}",
        yes_no(comparison.digest_differs),
        yes_no(comparison.size_differs),
        yes_no(comparison.modified_differs),
    );

    if comparison.size_differs {
        line.push_str(&format!(
            " ({} <=> {})",
            comparison.size_a, comparison.size_b
        ));
    }
    if comparison.modified_differs {
        line.push_str(&format!(
            " ({} <=> {})",
            comparison.modified_a.format("%Y-%m-%d %H:%M:%S"),
            comparison.modified_b.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    line
}

/// Print the four sections of a tree comparison
pub fn display_diff(diff: &DiffResult, details: &[FileComparison]) {
    println!("{}", style("=== Additions ===").bold());
    for path in &diff.additions {
        println!("{} {}", style("+").green(), path.display());
    }

    println!("\n{}", style("=== Deletions ===").bold());
    for path in &diff.deletions {
        println!("{} {}", style("-").red(), path.display());
    }

    println!("\n{}", style("=== Modifications ===").bold());
    for path in &diff.modifications {
        println!("{} {}", style("*").yellow(), path.display());
        if let Some(comparison) = details.iter().find(|c| &c.path == path) {
            println!("    {}", style(describe_comparison(comparison)).dim());
        }
    }

    println!("\n{}", style("=== Relocations ===").bold());
    for relocation in &diff.relocations {
        println!(
            "{} Hash {} moved:",
            style("~").cyan(),
            style(relocation.digest.short()).cyan()
        );
        println!("  A: {}", format_path_list(&relocation.paths_in_a));
        println!("  B: {}", format_path_list(&relocation.paths_in_b));
    }
}

/// Print duplicate groups followed by a summary line
pub fn display_duplicates(groups: &[DuplicateGroup], summary: &DuplicateSummary) {
    println!("{}", style("=== Duplicates ===").bold());
    for group in groups {
        println!("{}", style(group.digest.as_str()).cyan());
        for path in &group.paths {
            println!("   {}", path.display());
        }
    }

    println!();
    println!(
        "{} groups, {} redundant files, {} reclaimable",
        style(summary.groups).green(),
        style(summary.redundant_files).green(),
        style(format_bytes(summary.reclaimable_bytes)).green()
    );
}

/// Note files that were found but could not be read
pub fn display_skipped(index: &DirectoryIndex) {
    let skipped = index.skipped();
    if skipped.is_empty() {
        return;
    }

    display_warning(&format!("{} files could not be read:", skipped.len()));
    for path in skipped {
        println!("   {}", style(path.display()).dim());
    }
}

/// List target files kept because their source could not be read
pub fn display_held_back(paths: &[PathBuf]) {
    if paths.is_empty() {
        return;
    }

    display_warning(&format!(
        "{} files not deleted, their source exists but was unreadable:",
        paths.len()
    ));
    for path in paths {
        println!("   {}", style(path.display()).dim());
    }
}

/// Print totals after a sync
pub fn display_sync_report(report: &ExecutionReport) {
    println!();
    println!("{}", style("Sync Statistics:").bold().underlined());
    println!("  Files copied: {}", style(report.copied.len()).green());
    println!("  Files deleted: {}", style(report.deleted.len()).green());
    println!(
        "  Bytes copied: {}",
        style(format_bytes(report.bytes_copied)).green()
    );
    println!("  Already gone: {}", style(report.skipped.len()).yellow());
    println!("  Errors: {}", error_count(report.failures.len()));
}

/// Print totals after a hardlink run
pub fn display_link_report(report: &LinkReport) {
    println!();
    println!("{}", style("Dedup Statistics:").bold().underlined());
    println!("  Files linked: {}", style(report.linked.len()).green());
    println!(
        "  Already linked: {}",
        style(report.already_linked.len()).yellow()
    );
    println!(
        "  Space reclaimed: {}",
        style(format_bytes(report.reclaimed_bytes)).green()
    );
    println!("  Errors: {}", error_count(report.failures.len()));
}

fn error_count(count: usize) -> console::StyledObject<usize> {
    if count > 0 {
        style(count).red()
    } else {
        style(count).green()
    }
}

/// Display a warning message with proper formatting
pub fn display_warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

/// Display an error message with proper formatting
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

/// Display a success message with proper formatting
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), style(message).green());
}

/// Display an info message with proper formatting
pub fn display_info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), style(message).blue());
}

/// Prints each sync or link action as it happens
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl ConsoleObserver {
    fn print_error(path: &Path, error: &Error) {
        println!(
            "{} {}: {}",
            style("[ERROR]").red().bold(),
            path.display(),
            error
        );
    }
}

impl ExecutionObserver for ConsoleObserver {
    fn action_started(&self, action: &SyncAction) {
        let label = format!("[{}]", action.label());
        let label = match action {
            SyncAction::Copy(_) => style(label).green(),
            SyncAction::Delete(_) => style(label).yellow(),
        };
        println!("{} {}", label, action.path().display());
    }

    fn action_failed(&self, action: &SyncAction, error: &Error) {
        Self::print_error(action.path(), error);
    }

    fn link_completed(&self, action: &LinkAction) {
        println!(
            "{} {} -> {}",
            style("[LINKED]").green(),
            action.duplicate.display(),
            action.master.display()
        );
    }

    fn link_failed(&self, action: &LinkAction, error: &Error) {
        Self::print_error(&action.duplicate, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    #[rstest]
    #[case(0, "0.00 B")]
    #[case(1023, "1023.00 B")]
    #[case(1024, "1.00 KB")]
    #[case(5 * 1024 * 1024, "5.00 MB")]
    fn test_format_bytes(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_bytes(bytes), expected);
    }

    #[test]
    fn test_format_path_list() {
        assert_eq!(format_path_list(&[]), "[]");
        assert_eq!(
            format_path_list(&[PathBuf::from("x/a.txt"), PathBuf::from("b.txt")]),
            "[x/a.txt, b.txt]"
        );
    }

    #[test]
    fn test_describe_comparison() {
        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let comparison = FileComparison {
            path: PathBuf::from("f"),
            same_position: true,
            size_differs: true,
            modified_differs: false,
            digest_differs: true,
            size_a: 3,
            size_b: 9,
            modified_a: when,
            modified_b: when,
        };

        assert_eq!(
            describe_comparison(&comparison),
            "Hash: Yes, Size: Yes, Date: No (3 <=> 9)"
        );
    }
}

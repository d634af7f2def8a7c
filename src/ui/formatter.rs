//! Pure formatting functions for UI output.
//!
//! `format_*` functions build the text and are unit tested; `display_*` functions
//! print it. Styling comes from `console`, which drops colors when the output is
//! not a terminal.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::domain::Version;
use crate::workflow::{Action, StatusReport};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Banner shown once when running with --whatif
pub fn display_whatif_banner() {
    println!(
        "{}",
        style("*** Running with whatif ON - no writes ***").bold()
    );
}

/// One line per action, marked as skipped when nothing was executed
pub fn format_action(action: &Action, whatif: bool) -> String {
    if whatif {
        format!("[whatif] {}", action)
    } else {
        action.to_string()
    }
}

/// Display the actions an operation performed (or would have performed).
pub fn display_actions(actions: &[Action], whatif: bool) {
    for action in actions {
        let line = format_action(action, whatif);
        if whatif {
            display_status(&line);
        } else {
            display_success(&line);
        }
    }
}

pub fn format_latest(version: &Version) -> String {
    format!("Latest version: {}", version)
}

/// Lines of the `status` command output
pub fn format_status_report(report: &StatusReport) -> Vec<String> {
    let mut lines = vec![
        format_latest(&report.latest),
        format!("  - Next release version would be: {}", report.candidate),
        format!("  - Next hotfix version would be: {}", report.hotfix),
        String::new(),
        "Branches:".to_string(),
    ];

    for branch in &report.branches {
        let marker = if report.queue.contains(branch) { " *" } else { "" };
        lines.push(format!("  {}{}", branch, marker));
    }

    lines.push(String::new());
    lines.push(format!("Queue ({:?}):", report.queue.state()));
    if report.pull_request_counts.is_empty() {
        lines.push("  (empty)".to_string());
    }
    for (branch, count) in &report.pull_request_counts {
        lines.push(format!("  {} (PRs={})", branch, count));
    }

    lines
}

/// Display the release train status.
pub fn display_status_report(report: &StatusReport) {
    for line in format_status_report(report) {
        println!("{}", line);
    }
    for warning in report.queue.warnings() {
        display_boundary_warning(warning);
    }
}

/// Display the queued branches before asking which one to accept.
pub fn display_queue(queue: &[String]) {
    println!("\n{}", style("There is more than one item in the queue:").bold());
    for branch in queue {
        println!("  {}", branch);
    }
}

//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, BufRead, Write};

use crate::domain::Queue;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_actions, display_boundary_warning, display_error, display_queue, display_status,
    display_status_report, display_success, display_whatif_banner,
};

/// Reads a yes/no answer; only "y" or "yes" (case-insensitive) count as yes.
pub fn read_confirmation<R: BufRead>(input: &mut R) -> io::Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;

    let response = line.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Default is "no" if user presses Enter.
///
/// # Arguments
/// * `prompt` - The prompt message to display (without the "(y/N): " suffix)
///
/// # Returns
/// * `Ok(true)` - If user entered "y" or "yes"
/// * `Ok(false)` - Otherwise (including Enter, or "n"/"no")
/// * `Err` - If input error occurs
pub fn confirm_action(prompt: &str) -> io::Result<bool> {
    print!("\n{} (y/N): ", prompt);
    io::stdout().flush()?;

    read_confirmation(&mut io::stdin().lock())
}

/// Shows the queue and asks whether its head should be accepted.
pub fn confirm_accept(queue: &Queue) -> io::Result<bool> {
    display_queue(queue.entries());
    let head = queue.head().unwrap_or_default();
    confirm_action(&format!(
        "The first branch '{}' will be accepted. Continue?",
        head
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_confirmation_yes() {
        assert!(read_confirmation(&mut Cursor::new("y\n")).unwrap());
        assert!(read_confirmation(&mut Cursor::new("YES\n")).unwrap());
    }

    #[test]
    fn test_read_confirmation_defaults_to_no() {
        assert!(!read_confirmation(&mut Cursor::new("\n")).unwrap());
        assert!(!read_confirmation(&mut Cursor::new("n\n")).unwrap());
        assert!(!read_confirmation(&mut Cursor::new("sure\n")).unwrap());
        assert!(!read_confirmation(&mut Cursor::new("")).unwrap());
    }
}

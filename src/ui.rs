//! Status output
//!
//! Everything here goes to stderr; stdout is reserved for state payloads so
//! they can be piped.

use colored::Colorize;

/// Print a success message
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    eprintln!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    eprintln!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    eprintln!();
    eprintln!("{}", title.bold());
    eprintln!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    eprintln!("  {}: {}", key.dimmed(), value);
}

/// Colored label for a planned operation
pub fn op_label(op: declarative::Operation) -> String {
    use declarative::Operation;
    let label = op.to_string();
    match op {
        Operation::NoOp => label.dimmed().to_string(),
        Operation::Create => label.green().to_string(),
        Operation::Update => label.yellow().to_string(),
        Operation::Destroy => label.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::Operation;

    #[test]
    fn test_op_label_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(op_label(Operation::Create), "create");
        assert_eq!(op_label(Operation::NoOp), "no-op");
        colored::control::unset_override();
    }
}

//! CLI output formatting utilities

use colored::Colorize;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print an aligned `key: value` line
pub fn field(key: &str, value: &str) {
    println!("  {:<22} {}", format!("{}:", key).bold(), value);
}

/// Describe a secret without revealing it
pub fn redact(secret: &str) -> String {
    if secret.is_empty() {
        "(not set)".red().to_string()
    } else {
        format!("set ({} bytes)", secret.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_hides_value() {
        colored::control::set_override(false);
        assert_eq!(redact("supersecret"), "set (11 bytes)");
        assert_eq!(redact(""), "(not set)");
    }
}

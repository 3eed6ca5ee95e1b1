//! Terminal output formatting.

use console::style;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), message);
}

/// Prints one indented trace frame under an error.
pub fn trace(frame: &str) {
    eprintln!("    {}", style(frame).dim());
}

//! Output formatting utilities
//!
//! Status lines go to stderr; stdout carries only graph and region output.

use colored::*;

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// Print one item per line on stdout
pub fn print_lines<I, T>(items: I)
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    for item in items {
        println!("{}", item);
    }
}

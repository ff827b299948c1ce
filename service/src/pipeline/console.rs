//! Human-readable progress output

use std::fmt::Display;

use colored::Colorize;

/// Width of the `=` rule around banners
const RULE_WIDTH: usize = 80;

/// Prints progress to stdout and problems to stderr
///
/// A quiet console drops progress and warnings; errors are always printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    quiet: bool,
}

impl Console {
    /// Create a console
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// A console that only prints errors
    #[must_use]
    pub fn quiet() -> Self {
        Self::new(true)
    }

    /// Rule, title, rule, blank line
    pub fn banner(&self, title: &str) {
        self.rule();
        self.line(title.bold());
        self.rule();
        self.blank();
    }

    /// A line of `=`
    pub fn rule(&self) {
        self.line("=".repeat(RULE_WIDTH));
    }

    /// A plain progress line
    pub fn line(&self, message: impl Display) {
        if !self.quiet {
            println!("{message}");
        }
    }

    /// An empty line
    pub fn blank(&self) {
        self.line("");
    }

    /// `✓ message`, indented by `depth` levels
    pub fn check(&self, depth: usize, message: impl Display) {
        self.line(format!("{}{} {message}", "  ".repeat(depth), "✓".green()));
    }

    /// Warning on stderr
    pub fn warning(&self, message: impl Display) {
        if !self.quiet {
            eprintln!("{}", format!("Warning: {message}").yellow());
        }
    }

    /// `⚠ Warning: message`, indented, on stderr
    pub fn soft_warning(&self, depth: usize, message: impl Display) {
        if !self.quiet {
            eprintln!("{}{}", "  ".repeat(depth), format!("⚠ Warning: {message}").yellow());
        }
    }

    /// `Error: message` on stderr
    pub fn error(&self, message: impl Display) {
        eprintln!("{}", format!("Error: {message}").red());
    }

    /// A detail line under an error, on stderr
    pub fn error_detail(&self, message: impl Display) {
        eprintln!("  {message}");
    }
}

use console::style;

/// Styled terminal output. `quiet` suppresses everything but errors.
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold());
            println!("{}", "─".repeat(40));
        }
    }

    /// Aligned `key: value` row
    pub fn field(&self, key: &str, value: impl std::fmt::Display) {
        if !self.quiet {
            println!("  {:<16} {}", style(format!("{}:", key)).dim(), value);
        }
    }

    pub fn item(&self, message: &str) {
        if !self.quiet {
            println!("  • {}", message);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

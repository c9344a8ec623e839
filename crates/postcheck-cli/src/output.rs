//! Verdict reporting on stderr

use console::{style, Term};
use postcheck::{ScenarioFailure, VerificationReport};

/// Prints the pass/fail verdict of a run
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Reporter {
    /// Create a reporter writing to stderr
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an informational line
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let _ = self.term.write_line(message);
    }

    /// Report a verified run
    pub fn verified(&self, report: &VerificationReport) {
        self.success(&verified_line(report));
        if let Some(key) = &report.correlation_key {
            self.info(&format!("  correlation key: {key}"));
        }
    }

    /// Report a failed run
    pub fn failed(&self, failure: &ScenarioFailure) {
        self.failure(&format!("stopped at {}: {}", failure.reached, failure.error));
    }
}

fn verified_line(report: &VerificationReport) -> String {
    let renderings: Vec<String> = report
        .renderings_checked
        .iter()
        .map(ToString::to_string)
        .collect();
    format!(
        "{} in {:.1}s (found by {}; checked {})",
        report.reached,
        report.elapsed.as_secs_f64(),
        report.strategy,
        renderings.join(", ")
    )
}

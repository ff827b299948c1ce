//! Per-run outcome tally

use tracing::error;

use super::Console;
use crate::error::PipelineError;

/// A unit of work that did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Class key, file name or other unit label
    pub name: String,
    /// Why it was skipped or failed
    pub reason: String,
}

/// Successes, skips and failures of one run
///
/// Failures are per unit: a failed class never stops the others, but any
/// failure makes the run unsuccessful.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed units
    pub succeeded: Vec<String>,
    /// Units deliberately not processed
    pub skipped: Vec<Outcome>,
    /// Units that failed
    pub failed: Vec<Outcome>,
}

impl RunSummary {
    /// Record a completed unit
    pub fn success(&mut self, name: impl Into<String>) {
        self.succeeded.push(name.into());
    }

    /// Record a skipped unit
    pub fn skip(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(Outcome {
            name: name.into(),
            reason: reason.into(),
        });
    }

    /// Record a failed unit and log it
    pub fn fail(&mut self, name: impl Into<String>, err: &PipelineError) {
        let name = name.into();
        error!(unit = %name, error = %err, "failed");
        self.failed.push(Outcome {
            name,
            reason: err.to_string(),
        });
    }

    /// Append another summary's entries
    pub fn merge(&mut self, other: Self) {
        self.succeeded.extend(other.succeeded);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    /// Whether nothing failed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Print the tally
    pub fn print(&self, console: &Console) {
        console.line(format!(
            "Summary: {} succeeded, {} skipped, {} failed",
            self.succeeded.len(),
            self.skipped.len(),
            self.failed.len()
        ));
        for failure in &self.failed {
            console.error(format!("{}: {}", failure.name, failure.reason));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tally() {
        let mut summary = RunSummary::default();
        summary.success("hri-Dataset");
        summary.skip("hri-Agent", "no imports configuration");
        assert!(summary.is_success());

        let mut other = RunSummary::default();
        other.fail("hri-Kind", &PipelineError::missing_input("Schema file", "x.yaml"));
        summary.merge(other);

        assert!(!summary.is_success());
        assert_eq!(summary.succeeded, vec!["hri-Dataset"]);
        assert_eq!(summary.failed[0].reason, "Schema file not found at x.yaml");
    }
}

//! Fatal startup errors.
//!
//! Per-sample evaluation problems are never errors: the sampler turns them into
//! `Sample::Break`. Everything here aborts the program before the first frame.

use std::io::Write;

use log::error;
use thiserror::Error;

use crate::expr::ExprError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read the function from stdin: {0}")]
    Prompt(#[from] std::io::Error),

    #[error("failure in conversion of expression: {0}")]
    Expression(#[from] ExprError),

    #[error("invalid plot configuration: {0}")]
    Config(String),

    #[error("failed to create window: {0:#}")]
    Window(anyhow::Error),

    #[error("failed to initialize graphics: {0:#}")]
    Graphics(anyhow::Error),
}

impl StartupError {
    /// Process exit code for this error. Each class gets its own negative code.
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Expression(_) => -1,
            StartupError::Window(_) => -2,
            StartupError::Graphics(_) => -3,
            StartupError::Prompt(_) => -4,
            StartupError::Config(_) => -5,
        }
    }

    /// Log the error and write it to `out` (stderr in the binary).
    pub fn report<W: Write>(&self, mut out: W) {
        error!("{self}");
        // Nothing left to report to if this write fails.
        let _ = writeln!(out, "\n{self}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_and_negative() {
        let errors = [
            StartupError::Expression(ExprError::Empty),
            StartupError::Window(anyhow::anyhow!("no display")),
            StartupError::Graphics(anyhow::anyhow!("no adapter")),
            StartupError::Prompt(std::io::Error::other("closed")),
            StartupError::Config("bad".to_string()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(StartupError::exit_code).collect();
        assert!(codes.iter().all(|&c| c < 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn report_writes_every_class_to_the_output() {
        let errors = [
            StartupError::Prompt(std::io::Error::other("closed")),
            StartupError::Expression(ExprError::Empty),
            StartupError::Config("sample_count must be at least 2".to_string()),
        ];
        for err in errors {
            let mut out = Vec::new();
            err.report(&mut out);
            let text = String::from_utf8(out).unwrap();
            assert_eq!(text, format!("\n{err}\n"));
        }
    }

    #[test]
    fn expression_error_keeps_the_legacy_message() {
        let err = StartupError::from(ExprError::Empty);
        assert!(err.to_string().starts_with("failure in conversion of expression"));
    }
}

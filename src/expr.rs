//! User expression compilation.
//!
//! The plot core only needs "evaluate f at x". This module turns the user's text into
//! such a function using `meval`, bound to a single free variable. Compiling happens
//! once at startup; a failure here is fatal and happens before any sampling.

use std::fmt;

use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExprError {
    #[error("the expression is empty")]
    Empty,

    #[error("could not parse {text:?}: {reason}")]
    Parse { text: String, reason: String },

    #[error("could not bind variable `{var}` in {text:?}: {reason}")]
    Bind {
        text: String,
        var: String,
        reason: String,
    },
}

/// A compiled single-variable function.
///
/// Evaluation never fails: domain errors come back as NaN or infinity, which the
/// sampler treats as undefined points.
pub struct Expression {
    text: String,
    var: String,
    func: Box<dyn Fn(f64) -> f64>,
}

impl Expression {
    /// Parse `text` and bind `var` as its only free variable.
    pub fn compile(text: &str, var: &str) -> Result<Self, ExprError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ExprError::Empty);
        }

        let expr = text.parse::<meval::Expr>().map_err(|e| ExprError::Parse {
            text: text.to_string(),
            reason: e.to_string(),
        })?;

        let func = expr.bind(var).map_err(|e| ExprError::Bind {
            text: text.to_string(),
            var: var.to_string(),
            reason: e.to_string(),
        })?;

        debug!("compiled f({var}) = {text}");

        Ok(Self {
            text: text.to_string(),
            var: var.to_string(),
            func: Box::new(func),
        })
    }

    /// Evaluate at `x`.
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        (self.func)(x)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("text", &self.text)
            .field("var", &self.var)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f({}) = {}", self.var, self.text)
    }
}

//! Validation policy for view definitions.

use crate::error::{TtvError, TtvResult};
use crate::resource::ResourceLimiter;
use crate::view::ViewRaw;

/// How strictly a view is checked before it is compiled.
#[derive(Clone, Copy, Debug)]
pub struct ViewPolicy {
    /// Reject unknown operators and extra operands instead of rendering or dropping them.
    pub strict_tokens: bool,
    /// Turn the first URL in each text node into a link after a line is rendered.
    pub link_urls: bool,
}

impl Default for ViewPolicy {
    fn default() -> Self {
        Self {
            strict_tokens: false,
            link_urls: true,
        }
    }
}

impl ViewPolicy {
    pub fn strict() -> Self {
        Self {
            strict_tokens: true,
            ..Self::default()
        }
    }

    /// Checks the shape of a raw view against the resource limits.
    pub fn validate_raw(&self, view: &ViewRaw, limits: &ResourceLimiter) -> TtvResult<()> {
        if view.article.len() > limits.max_lines {
            return Err(TtvError::ResourceLimit(format!(
                "{} article lines",
                view.article.len()
            )));
        }
        for (index, line) in view.article.iter().enumerate() {
            if line.len() > limits.max_tokens_per_line {
                return Err(TtvError::ResourceLimit(format!(
                    "{} tokens on line {index}",
                    line.len()
                )));
            }
        }
        for (name, rules) in &view.replacers {
            if name.trim().is_empty() {
                return Err(TtvError::InvalidView("replacer with an empty name".to_string()));
            }
            for (literal, _) in rules {
                check_pattern_length(literal, limits)?;
            }
        }
        for (name, literal) in &view.shaders {
            if name.trim().is_empty() {
                return Err(TtvError::InvalidView("shader with an empty name".to_string()));
            }
            check_pattern_length(literal, limits)?;
        }
        Ok(())
    }

    /// Reports a token problem: an error in strict mode, a no-op otherwise.
    pub(crate) fn token_problem(&self, message: impl FnOnce() -> String) -> TtvResult<()> {
        if self.strict_tokens {
            Err(TtvError::PolicyViolation(message()))
        } else {
            Ok(())
        }
    }
}

fn check_pattern_length(literal: &str, limits: &ResourceLimiter) -> TtvResult<()> {
    if literal.len() > limits.max_pattern_length {
        return Err(TtvError::ResourceLimit(format!(
            "regex literal of {} bytes",
            literal.len()
        )));
    }
    Ok(())
}

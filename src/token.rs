//! ViewScript tokens, parsed once from JSON when a view is compiled.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::error::{TtvError, TtvResult};
use crate::operators::{OperatorId, OperatorTable};
use crate::policy::ViewPolicy;
use crate::resource::ResourceLimiter;

/// Shared string storage used by compiled tokens.
pub type SharedStr = Arc<str>;

/// One element of an article line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A string, number or boolean, already converted to its text.
    Literal(SharedStr),
    /// A registered operator and the operands it will receive.
    Call {
        operator: OperatorId,
        operands: Vec<Token>,
    },
    /// An operator name nothing is registered under; renders as empty text.
    Unknown { name: SharedStr },
}

/// A line of tokens; renders as one paragraph.
pub type Line = Vec<Token>;

pub(crate) struct TokenParser<'a> {
    pub operators: &'a OperatorTable,
    pub policy: &'a ViewPolicy,
    pub limits: &'a ResourceLimiter,
}

impl TokenParser<'_> {
    pub fn parse_line(&self, line: &[Value]) -> TtvResult<Line> {
        line.iter().map(|value| self.parse(value, 0)).collect()
    }

    fn parse(&self, value: &Value, depth: usize) -> TtvResult<Token> {
        if depth > self.limits.max_token_depth {
            return Err(TtvError::ResourceLimit(format!(
                "token nesting deeper than {}",
                self.limits.max_token_depth
            )));
        }
        match value {
            Value::String(text) => Ok(Token::Literal(Arc::from(text.as_str()))),
            Value::Number(number) => Ok(Token::Literal(Arc::from(number_to_text(number)))),
            Value::Bool(flag) => Ok(Token::Literal(Arc::from(if *flag { "true" } else { "false" }))),
            Value::Array(items) => self.parse_call(items, depth),
            Value::Null | Value::Object(_) => Err(malformed(value)),
        }
    }

    fn parse_call(&self, items: &[Value], depth: usize) -> TtvResult<Token> {
        let Some((Value::String(name), operands)) = items.split_first() else {
            return Err(malformed(&Value::Array(items.to_vec())));
        };
        let Some(operator) = self.operators.resolve(name) else {
            self.policy
                .token_problem(|| format!("unknown operator '{name}'"))?;
            warn!(operator = %name, "unknown operator renders as empty text");
            return Ok(Token::Unknown {
                name: Arc::from(name.as_str()),
            });
        };
        let arity = self.operators.get(operator).arity;
        if operands.len() > arity {
            self.policy.token_problem(|| {
                format!(
                    "operator '{name}' takes {arity} operands, got {}",
                    operands.len()
                )
            })?;
            warn!(operator = %name, arity, extra = operands.len() - arity, "ignoring extra operands");
        }
        let operands = operands
            .iter()
            .take(arity)
            .map(|operand| self.parse(operand, depth + 1))
            .collect::<TtvResult<Vec<_>>>()?;
        Ok(Token::Call { operator, operands })
    }
}

/// `null`, objects, `[]` and lists whose head is not a string.
fn malformed(value: &Value) -> TtvError {
    TtvError::InvalidView(format!("malformed token {value}"))
}

/// Number to text the way the view language's host prints numbers: `3`, not `3.0`.
pub fn number_to_text(number: &serde_json::Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1e21 => format!("{float:.0}"),
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

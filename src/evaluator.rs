//! Recursive ViewScript evaluation.

use std::collections::BTreeMap;

use crate::event::CalendarEvent;
use crate::markup::{Node, Paragraph};
use crate::operators::OperatorTable;
use crate::replacer::Replacer;
use crate::shader::ShaderTable;
use crate::token::Token;
use crate::view::VarValue;

/// Per-render input: the event an article is being built for.
#[derive(Clone, Copy, Debug)]
pub struct ArticleState<'a> {
    pub event: &'a CalendarEvent,
}

/// Everything an operator may read while one article is rendered.
pub struct EvalContext<'a> {
    pub state: &'a ArticleState<'a>,
    pub variables: &'a BTreeMap<String, VarValue>,
    pub replacers: &'a BTreeMap<String, Replacer>,
    pub shaders: &'a ShaderTable,
    pub operators: &'a OperatorTable,
}

impl EvalContext<'_> {
    /// Evaluates one token. Operands are evaluated depth first, left to right,
    /// before the operator runs; missing operands are padded with empty text.
    pub fn evaluate(&self, token: &Token) -> Node {
        match token {
            Token::Literal(text) => Node::text(text.as_ref()),
            Token::Call { operator, operands } => {
                let operator = self.operators.get(*operator);
                let mut values: Vec<Node> = operands
                    .iter()
                    .map(|operand| self.evaluate(operand))
                    .collect();
                values.resize_with(operator.arity.max(values.len()), Node::empty);
                (operator.handler)(self, &values)
            }
            Token::Unknown { .. } => Node::empty(),
        }
    }

    /// Evaluates a line in order into one paragraph.
    pub fn evaluate_line(&self, line: &[Token]) -> Paragraph {
        let mut paragraph = Paragraph::default();
        for token in line {
            paragraph.push(self.evaluate(token));
        }
        paragraph
    }
}

#[cfg(test)]
#[path = "tests/evaluator_tests.rs"]
mod tests;

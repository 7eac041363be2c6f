//! The operator registration table and the built-in ViewScript operators.
//!
//! Every operator receives its operands already evaluated, left to right, and
//! returns one node. Only the wrapper operators produce elements; everything
//! else returns text, which is escaped when the article is serialized.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::evaluator::EvalContext;
use crate::markup::{Element, InlineTag, Node};
use crate::token::SharedStr;

pub type OperatorFn = fn(&EvalContext<'_>, &[Node]) -> Node;

/// Index of an operator inside its [`OperatorTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OperatorId(usize);

#[derive(Clone)]
pub struct Operator {
    pub name: SharedStr,
    /// Operands beyond this count are dropped at compile time; missing ones
    /// are passed as empty text.
    pub arity: usize,
    pub handler: OperatorFn,
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
pub struct OperatorTable {
    operators: Vec<Operator>,
    by_name: HashMap<SharedStr, OperatorId>,
}

impl OperatorTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// `replace`, `shader`, `var` and the inline markup wrappers.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        table.register("replace", 2, replace);
        table.register("shader", 4, shader);
        table.register("var", 1, var);
        table.register("<span>", 2, span);
        table.register("<strong>", 2, strong);
        table.register("<em>", 2, em);
        table.register("<i>", 2, italic);
        table.register("<b>", 2, bold);
        table.register("<time>", 2, time);
        table.register("<abbr>", 2, abbr);
        table
    }

    /// Registers `handler` under `name`, replacing any earlier registration.
    pub fn register(&mut self, name: &str, arity: usize, handler: OperatorFn) -> OperatorId {
        let operator = Operator {
            name: Arc::from(name),
            arity,
            handler,
        };
        if let Some(&id) = self.by_name.get(name) {
            self.operators[id.0] = operator;
            return id;
        }
        let id = OperatorId(self.operators.len());
        self.by_name.insert(Arc::clone(&operator.name), id);
        self.operators.push(operator);
        id
    }

    pub fn resolve(&self, name: &str) -> Option<OperatorId> {
        self.by_name.get(name).copied()
    }

    /// Ids only come from this table, so lookups cannot miss.
    pub fn get(&self, id: OperatorId) -> &Operator {
        &self.operators[id.0]
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operators.iter().map(|operator| operator.name.as_ref())
    }
}

/// Text of operand `index`, empty when the operand is missing.
pub fn operand_text(operands: &[Node], index: usize) -> String {
    operands
        .get(index)
        .map(Node::text_content)
        .unwrap_or_default()
}

fn operand_index(operands: &[Node], index: usize) -> Option<usize> {
    operand_text(operands, index).trim().parse().ok()
}

fn replace(ctx: &EvalContext<'_>, operands: &[Node]) -> Node {
    let input = operand_text(operands, 0);
    let name = operand_text(operands, 1);
    match ctx.replacers.get(&name) {
        Some(replacer) => Node::Text(replacer.apply(&input)),
        None => Node::empty(),
    }
}

fn shader(ctx: &EvalContext<'_>, operands: &[Node]) -> Node {
    let input = operand_text(operands, 0);
    let name = operand_text(operands, 1);
    let (Some(index), Some(group)) = (operand_index(operands, 2), operand_index(operands, 3))
    else {
        return Node::empty();
    };
    ctx.shaders
        .extract(&name, &input, index, group)
        .map(Node::Text)
        .unwrap_or_else(Node::empty)
}

fn var(ctx: &EvalContext<'_>, operands: &[Node]) -> Node {
    let key = operand_text(operands, 0);
    if let Some(value) = ctx.variables.get(&key) {
        return Node::Text(value.to_string());
    }
    ctx.state
        .event
        .reserved_field(&key)
        .map(Node::Text)
        .unwrap_or_else(Node::empty)
}

fn wrap(tag: InlineTag, operands: &[Node]) -> Node {
    let mut element = Element::new(tag);
    let class = operand_text(operands, 1);
    if !class.is_empty() {
        element = element.with_attr("class", class);
    }
    if tag == InlineTag::Time {
        element = element.with_attr("datetime", operand_text(operands, 0));
    }
    if let Some(content) = operands.first().filter(|node| !node.is_empty_text()) {
        element = element.with_child(content.clone());
    }
    Node::Element(element)
}

fn span(_: &EvalContext<'_>, operands: &[Node]) -> Node {
    wrap(InlineTag::Span, operands)
}

fn strong(_: &EvalContext<'_>, operands: &[Node]) -> Node {
    wrap(InlineTag::Strong, operands)
}

fn em(_: &EvalContext<'_>, operands: &[Node]) -> Node {
    wrap(InlineTag::Em, operands)
}

fn italic(_: &EvalContext<'_>, operands: &[Node]) -> Node {
    wrap(InlineTag::I, operands)
}

fn bold(_: &EvalContext<'_>, operands: &[Node]) -> Node {
    wrap(InlineTag::B, operands)
}

fn time(_: &EvalContext<'_>, operands: &[Node]) -> Node {
    wrap(InlineTag::Time, operands)
}

fn abbr(_: &EvalContext<'_>, operands: &[Node]) -> Node {
    wrap(InlineTag::Abbr, operands)
}

#[cfg(test)]
#[path = "tests/operators_tests.rs"]
mod tests;

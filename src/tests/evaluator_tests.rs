use chrono::DateTime;
use serde_json::{json, Value};

use super::*;
use crate::policy::ViewPolicy;
use crate::resource::ResourceLimiter;
use crate::token::TokenParser;

fn event() -> CalendarEvent {
    let mut event = CalendarEvent::new(
        DateTime::parse_from_rfc3339("2026-10-19T09:00:00+11:00").expect("start"),
        DateTime::parse_from_rfc3339("2026-10-19T10:00:00+11:00").expect("end"),
    );
    event.summary = "Lecture".to_string();
    event.location = "Hall <A>".to_string();
    event
}

fn render(line: Value) -> String {
    let operators = OperatorTable::builtin();
    let policy = ViewPolicy::default();
    let limits = ResourceLimiter::default();
    let parser = TokenParser {
        operators: &operators,
        policy: &policy,
        limits: &limits,
    };
    let Value::Array(values) = line else {
        panic!("line must be an array");
    };
    let tokens = parser.parse_line(&values).expect("line parses");

    let event = event();
    let state = ArticleState { event: &event };
    let variables = BTreeMap::new();
    let replacers = BTreeMap::new();
    let shaders = ShaderTable::default();
    let ctx = EvalContext {
        state: &state,
        variables: &variables,
        replacers: &replacers,
        shaders: &shaders,
        operators: &operators,
    };
    let mut out = String::new();
    ctx.evaluate_line(&tokens).write_html(&mut out);
    out
}

#[test]
fn literals_render_in_order() {
    assert_eq!(render(json!(["At ", 3, " or ", true])), "<p>At 3 or true</p>");
}

#[test]
fn literal_markup_is_escaped() {
    assert_eq!(
        render(json!(["<script>alert(1)</script>"])),
        "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
    );
}

#[test]
fn operands_are_evaluated_before_the_operator() {
    assert_eq!(
        render(json!([["<strong>", ["var", "_event.location"], "loc"]])),
        "<p><strong class=\"loc\">Hall &lt;A&gt;</strong></p>"
    );
}

#[test]
fn operands_can_name_things_through_calls() {
    assert_eq!(
        render(json!([["var", ["<b>", "_event.summary"]]])),
        "<p>Lecture</p>"
    );
}

#[test]
fn missing_operands_are_empty_text() {
    assert_eq!(render(json!([["<em>", "x"]])), "<p><em>x</em></p>");
    assert_eq!(render(json!([["var"]])), "<p></p>");
    assert_eq!(render(json!([["shader", "x"]])), "<p></p>");
}

#[test]
fn unknown_operators_render_nothing() {
    assert_eq!(
        render(json!(["a", ["bogusOp", "x"], ["shader", "x", "nonexistent", 0, 0], "b"])),
        "<p>ab</p>"
    );
}

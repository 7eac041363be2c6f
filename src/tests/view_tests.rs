use chrono::DateTime;

use super::*;
use crate::error::TtvError;
use crate::evaluator::ArticleState;
use crate::event::CalendarEvent;
use crate::policy::ViewPolicy;
use crate::resource::ResourceLimiter;

const COURSE_VIEW: &str = r#"{
    "title": "Course timetable",
    "variables": {"campus": "North"},
    "replacers": {"underscores": [["/_/g", " "]]},
    "shaders": {"desc": "/(\\d+)_([A-Z]+)/"},
    "article": [
        [["<strong>", ["shader", ["var", "_event.description"], "desc", 0, 2], "course"]],
        [["replace", ["var", "_event.description"], "underscores"]],
        ["Campus: ", ["var", "campus"]]
    ]
}"#;

fn event(description: &str) -> CalendarEvent {
    let mut event = CalendarEvent::new(
        DateTime::parse_from_rfc3339("2026-10-19T09:00:00+11:00").expect("start"),
        DateTime::parse_from_rfc3339("2026-10-19T10:00:00+11:00").expect("end"),
    );
    event.description = description.to_string();
    event
}

fn render(view: &ViewCompiled, event: &CalendarEvent) -> String {
    view.build_article(&ArticleState { event }).to_html()
}

#[test]
fn course_code_is_extracted_from_description() {
    let view = ViewRaw::from_json(COURSE_VIEW)
        .expect("view parses")
        .compile()
        .expect("view compiles");
    assert_eq!(view.title(), "Course timetable");
    assert_eq!(
        render(&view, &event("101_MATH lecture")),
        "<article><p><strong class=\"course\">MATH</strong></p>\
         <p>101 MATH lecture</p><p>Campus: North</p></article>"
    );
}

#[test]
fn feed_markup_is_inert() {
    let view = ViewRaw::from_json(r#"{"article": [[["var", "_event.description"]]]}"#)
        .expect("view parses")
        .compile()
        .expect("view compiles");
    assert_eq!(
        render(&view, &event("<script>alert(1)</script>")),
        "<article><p>&lt;script&gt;alert(1)&lt;/script&gt;</p></article>"
    );
}

#[test]
fn shader_results_are_cached_per_input() {
    let view = ViewRaw::from_json(COURSE_VIEW)
        .expect("view parses")
        .compile()
        .expect("view compiles");
    let lecture = event("101_MATH lecture");
    let first = render(&view, &lecture);
    let second = render(&view, &lecture);
    assert_eq!(first, second);
    let stats = view.shader_cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);

    render(&view, &event("202_CHEM lab"));
    assert_eq!(view.shader_cache_stats().entries, 2);
}

#[test]
fn missing_title_falls_back() {
    let raw = ViewRaw::from_json(r#"{"title": ""}"#).expect("view parses");
    assert_eq!(raw.resolved_title(), DEFAULT_TITLE);
    let view = ViewRaw::default().compile().expect("empty view compiles");
    assert_eq!(view.title(), "Timetable View");
    assert_eq!(render(&view, &event("x")), "<article></article>");
}

#[test]
fn invalid_regex_fails_the_whole_view() {
    for view in [
        r#"{"shaders": {"bad": "/(unclosed/"}}"#,
        r#"{"shaders": {"bad": "no slashes"}}"#,
        r#"{"replacers": {"bad": [["/a/y", "b"]]}}"#,
    ] {
        let err = ViewRaw::from_json(view)
            .expect("view parses")
            .compile()
            .expect_err("bad regex");
        assert!(matches!(err, TtvError::Pattern { .. }), "{view}: {err:?}");
    }
}

#[test]
fn unknown_operator_degrades_unless_strict() {
    let raw = ViewRaw::from_json(r#"{"article": [["a", ["bogusOp", "x"], "b"]]}"#)
        .expect("view parses");
    let view = raw.compile().expect("lenient compile");
    assert_eq!(render(&view, &event("")), "<article><p>ab</p></article>");

    let err = ViewCompiled::new(&raw, ViewPolicy::strict(), ResourceLimiter::default())
        .expect_err("strict compile");
    assert!(matches!(err, TtvError::PolicyViolation(_)));
}

#[test]
fn malformed_tokens_fail_the_view() {
    for view in [
        r#"{"article": [[null]]}"#,
        r#"{"article": [[[]]]}"#,
        r#"{"article": [[[3, "x"]]]}"#,
    ] {
        let err = ViewRaw::from_json(view)
            .expect("view parses")
            .compile()
            .expect_err("malformed token");
        assert!(matches!(err, TtvError::InvalidView(_)), "{view}: {err:?}");
    }
}

#[test]
fn urls_become_links_when_enabled() {
    let json = r#"{"article": [[["var", "_event.description"]]]}"#;
    let lecture = event("Stream at https://video.example.edu/live?id=4 today");

    let view = ViewCompiled::from_json(json, ViewPolicy::default(), ResourceLimiter::default())
        .expect("view compiles");
    assert_eq!(
        render(&view, &lecture),
        "<article><p>Stream at <a href=\"https://video.example.edu/live?id=4\">\
         video.example.edu</a> today</p></article>"
    );

    let plain = ViewPolicy {
        link_urls: false,
        ..ViewPolicy::default()
    };
    let view = ViewCompiled::from_json(json, plain, ResourceLimiter::default())
        .expect("view compiles");
    assert_eq!(
        render(&view, &lecture),
        "<article><p>Stream at https://video.example.edu/live?id=4 today</p></article>"
    );
}

#[test]
fn malformed_json_reports_location() {
    let err = ViewRaw::from_json("{\"article\": [[\"a\",]]}").expect_err("trailing comma");
    let TtvError::Serialization { src, .. } = err else {
        panic!("expected serialization error, got {err:?}");
    };
    assert!(src.contains("\"a\","));
}

#[test]
fn oversized_views_are_refused() {
    let limits = ResourceLimiter {
        max_view_bytes: 16,
        ..ResourceLimiter::default()
    };
    let err = ViewRaw::from_json_with_limits(COURSE_VIEW, &limits).expect_err("too large");
    assert!(matches!(err, TtvError::ResourceLimit(_)));

    let limits = ResourceLimiter {
        max_lines: 2,
        ..ResourceLimiter::default()
    };
    let raw = ViewRaw::from_json(COURSE_VIEW).expect("view parses");
    let err = ViewCompiled::new(&raw, ViewPolicy::default(), limits).expect_err("too many lines");
    assert!(matches!(err, TtvError::ResourceLimit(_)));
}

#[test]
fn numeric_variables_print_like_numbers() {
    let raw = ViewRaw::from_json(r#"{"variables": {"week": 7, "ratio": 0.5}}"#)
        .expect("view parses");
    assert_eq!(raw.variables["week"].to_string(), "7");
    assert_eq!(raw.variables["ratio"].to_string(), "0.5");
    let again = ViewRaw::from_json(&raw.to_json().expect("serializes")).expect("reparses");
    assert_eq!(again, raw);
}

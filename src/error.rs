use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type TtvResult<T> = Result<T, TtvError>;

#[derive(Debug, Error, Diagnostic)]
pub enum TtvError {
    #[error("invalid regex literal '{literal}': {message}")]
    #[diagnostic(code("ttv.pattern"), help("regex literals are written as \"/pattern/flags\""))]
    Pattern { literal: String, message: String },
    #[error("view validation failed: {0}")]
    #[diagnostic(code("ttv.invalid_view"))]
    InvalidView(String),
    #[error("resource limit exceeded: {0}")]
    #[diagnostic(code("ttv.resource_limit"))]
    ResourceLimit(String),
    #[error("view policy violation: {0}")]
    #[diagnostic(code("ttv.view_policy"))]
    PolicyViolation(String),
    #[error("invalid calendar event: {0}")]
    #[diagnostic(code("ttv.invalid_event"))]
    InvalidEvent(String),
    #[error("serialization error: {message}")]
    #[diagnostic(code("ttv.serialization"))]
    Serialization {
        message: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },
}

impl TtvError {
    pub(crate) fn pattern(literal: &str, message: impl Into<String>) -> Self {
        TtvError::Pattern {
            literal: literal.to_string(),
            message: message.into(),
        }
    }
}

/// Builds a `Serialization` error whose source window surrounds the byte
/// serde_json stopped at.
#[cold]
#[inline(never)]
pub(crate) fn json_deserialize_error(input: &str, err: &serde_json::Error) -> TtvError {
    let (offset, length) = json_error_span(input, err);
    let (window, local_offset) = json_error_window(input, offset, length);
    let max_len = window.len().saturating_sub(local_offset);
    let span_len = if max_len == 0 { 0 } else { length.min(max_len) };
    TtvError::Serialization {
        message: err.to_string(),
        src: window,
        span: (local_offset, span_len).into(),
    }
}

#[cold]
#[inline(never)]
fn json_error_span(input: &str, error: &serde_json::Error) -> (usize, usize) {
    let line = error.line();
    let column = error.column();
    if line == 0 || column == 0 {
        return (0, 1);
    }
    let mut offset = 0usize;
    for (index, chunk) in input.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let byte_index = chunk
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(idx, _)| idx)
                .unwrap_or(chunk.len().saturating_sub(1));
            return (offset + byte_index, 1);
        }
        offset += chunk.len();
    }
    (input.len().saturating_sub(1), 1)
}

#[cold]
#[inline(never)]
fn json_error_window(input: &str, offset: usize, length: usize) -> (String, usize) {
    const CONTEXT: usize = 160;
    let mut start = offset.saturating_sub(CONTEXT).min(input.len());
    let mut end = (offset + length + CONTEXT).min(input.len());
    while start > 0 && !input.is_char_boundary(start) {
        start -= 1;
    }
    while end < input.len() && !input.is_char_boundary(end) {
        end += 1;
    }
    (input[start..end].to_string(), offset.saturating_sub(start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_error_points_at_offending_line() {
        let input = "{\n  \"title\": \"x\",\n  \"article\": [}\n";
        let err = serde_json::from_str::<serde_json::Value>(input).expect_err("invalid json");
        match json_deserialize_error(input, &err) {
            TtvError::Serialization { src, span, .. } => {
                assert_eq!(src, input);
                let at = span.offset();
                assert!(at >= input.find("[}").unwrap_or(0));
                assert!(at < input.len());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn pattern_error_mentions_literal() {
        let err = TtvError::pattern("/(/", "unclosed group");
        assert!(err.to_string().contains("'/(/'"));
        assert!(err.to_string().contains("unclosed group"));
    }
}

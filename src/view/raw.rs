use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{json_deserialize_error, TtvError, TtvResult};
use crate::policy::ViewPolicy;
use crate::resource::ResourceLimiter;
use crate::token::number_to_text;

use super::compiled::ViewCompiled;

/// Title used when a view has none.
pub const DEFAULT_TITLE: &str = "Timetable View";

/// A static view variable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Text(text) => f.write_str(text),
            VarValue::Number(number) => f.write_str(&number_to_text(number)),
        }
    }
}

/// JSON-facing view definition.
///
/// Article tokens are kept as JSON values here and only turned into
/// [`crate::Token`]s when the view is compiled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewRaw {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, VarValue>,
    /// Named lists of `[regex literal, replacement]` pairs, applied in order.
    #[serde(default)]
    pub replacers: BTreeMap<String, Vec<(String, String)>>,
    #[serde(default)]
    pub shaders: BTreeMap<String, String>,
    #[serde(default)]
    pub article: Vec<Vec<Value>>,
}

impl ViewRaw {
    /// Parses a JSON view definition.
    pub fn from_json(input: &str) -> TtvResult<Self> {
        Self::from_json_with_limits(input, &ResourceLimiter::default())
    }

    /// Parses a JSON view definition, refusing input larger than the limits allow.
    pub fn from_json_with_limits(input: &str, limits: &ResourceLimiter) -> TtvResult<Self> {
        if input.len() > limits.max_view_bytes {
            return Err(TtvError::ResourceLimit(format!(
                "view definition of {} bytes",
                input.len()
            )));
        }
        serde_json::from_str(input).map_err(|err| json_deserialize_error(input, &err))
    }

    pub fn to_json(&self) -> TtvResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| TtvError::Serialization {
            message: err.to_string(),
            src: String::new(),
            span: (0, 0).into(),
        })
    }

    /// The title, falling back to [`DEFAULT_TITLE`] when absent or empty.
    pub fn resolved_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    /// Validates and compiles with the default policy and limits.
    pub fn compile(&self) -> TtvResult<ViewCompiled> {
        ViewCompiled::new(self, ViewPolicy::default(), ResourceLimiter::default())
    }
}

//! ViewScript: JSON view definitions that render calendar events into HTML.

mod config;
mod error;
mod escape;
mod evaluator;
mod event;
mod hyperlink;
mod markup;
mod operators;
mod policy;
mod regex_literal;
mod replacer;
mod resource;
mod shader;
mod timetable;
mod token;
mod view;

pub use config::{ConfigError, TtvConfig, DEFAULT_CORS_URL};
pub use error::{TtvError, TtvResult};
pub use escape::{encode_html, push_encoded};
pub use evaluator::{ArticleState, EvalContext};
pub use event::{format_local_timestamp, CalendarEvent, EventDuration};
pub use hyperlink::{link_urls, url_host};
pub use markup::{Article, Element, InlineTag, Node, Paragraph};
pub use operators::{operand_text, Operator, OperatorFn, OperatorId, OperatorTable};
pub use policy::ViewPolicy;
pub use regex_literal::{CompiledRegex, RegexFlags};
pub use replacer::{ReplaceRule, ReplacementTemplate, Replacer};
pub use resource::ResourceLimiter;
pub use shader::{MatchRecord, Shader, ShaderCacheStats, ShaderTable};
pub use timetable::{day_heading, progress, DayListing, ListItem, Timetable};
pub use token::{number_to_text, Line, SharedStr, Token};
pub use view::{VarValue, ViewCompiled, ViewRaw, DEFAULT_TITLE};

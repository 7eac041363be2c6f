//! View definitions: the JSON form and the compiled form used for rendering.

mod compiled;
mod raw;

pub use compiled::ViewCompiled;
pub use raw::{VarValue, ViewRaw, DEFAULT_TITLE};

#[cfg(test)]
#[path = "../tests/view_tests.rs"]
mod tests;

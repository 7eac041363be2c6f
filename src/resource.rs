/// Upper bounds applied while loading and compiling a view.
#[derive(Clone, Copy, Debug)]
pub struct ResourceLimiter {
    pub max_view_bytes: usize,
    pub max_lines: usize,
    pub max_tokens_per_line: usize,
    pub max_token_depth: usize,
    pub max_pattern_length: usize,
    /// Passed to the regex engine as its compiled program size limit.
    pub max_regex_size: usize,
}

impl Default for ResourceLimiter {
    fn default() -> Self {
        Self {
            max_view_bytes: 512 * 1024,
            max_lines: 512,
            max_tokens_per_line: 256,
            max_token_depth: 32,
            max_pattern_length: 4_096,
            max_regex_size: 1024 * 1024,
        }
    }
}

//! Parsing of delimited regex literals such as `"/([0-9]+)_(\w+)/gi"`.

use std::fmt;

use regex::{Captures, Regex, RegexBuilder};

use crate::error::{TtvError, TtvResult};
use crate::resource::ResourceLimiter;

/// Flags accepted after the closing delimiter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegexFlags {
    pub global: bool,
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_all: bool,
}

impl RegexFlags {
    fn parse(literal: &str, flags: &str) -> TtvResult<Self> {
        let mut parsed = RegexFlags::default();
        let mut unicode = false;
        for flag in flags.chars() {
            let slot = match flag {
                'g' => &mut parsed.global,
                'i' => &mut parsed.case_insensitive,
                'm' => &mut parsed.multi_line,
                's' => &mut parsed.dot_all,
                // Unicode mode is always on.
                'u' => &mut unicode,
                'y' => {
                    return Err(TtvError::pattern(literal, "sticky flag 'y' is not supported"))
                }
                other => {
                    return Err(TtvError::pattern(
                        literal,
                        format!("unknown flag '{other}'"),
                    ))
                }
            };
            if *slot {
                return Err(TtvError::pattern(literal, format!("duplicate flag '{flag}'")));
            }
            *slot = true;
        }
        Ok(parsed)
    }
}

impl fmt::Display for RegexFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, flag) in [
            (self.global, 'g'),
            (self.case_insensitive, 'i'),
            (self.multi_line, 'm'),
            (self.dot_all, 's'),
        ] {
            if set {
                write!(f, "{flag}")?;
            }
        }
        Ok(())
    }
}

/// A regex compiled from a literal; the only way replacers and shaders get a regex.
#[derive(Clone, Debug)]
pub struct CompiledRegex {
    regex: Regex,
    flags: RegexFlags,
    literal: String,
}

impl CompiledRegex {
    /// Compiles `literal` with the default resource limits.
    pub fn parse(literal: &str) -> TtvResult<Self> {
        Self::parse_with_limits(literal, &ResourceLimiter::default())
    }

    /// Splits `literal` at its last `/` into pattern and flags and compiles it.
    pub fn parse_with_limits(literal: &str, limits: &ResourceLimiter) -> TtvResult<Self> {
        if literal.len() > limits.max_pattern_length {
            return Err(TtvError::ResourceLimit(format!(
                "regex literal of {} bytes",
                literal.len()
            )));
        }
        let body = literal
            .strip_prefix('/')
            .ok_or_else(|| TtvError::pattern(literal, "literal must start with '/'"))?;
        let last_slash = body
            .rfind('/')
            .ok_or_else(|| TtvError::pattern(literal, "missing closing '/'"))?;
        let (pattern, flags) = (&body[..last_slash], &body[last_slash + 1..]);
        let flags = RegexFlags::parse(literal, flags)?;
        let regex = RegexBuilder::new(&unescape_slashes(pattern))
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .size_limit(limits.max_regex_size)
            .build()
            .map_err(|err| TtvError::pattern(literal, err.to_string()))?;
        Ok(Self {
            regex,
            flags,
            literal: literal.to_string(),
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn flags(&self) -> RegexFlags {
        self.flags
    }

    pub fn is_global(&self) -> bool {
        self.flags.global
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Every match for a global regex, otherwise at most the first.
    ///
    /// Each search resumes where the previous match ended; after an empty match
    /// it resumes one character further on, so an empty match right after a
    /// non-empty one is still reported.
    pub fn captures_all<'h>(&self, haystack: &'h str) -> Vec<Captures<'h>> {
        let mut found = Vec::new();
        let mut pos = 0;
        while pos <= haystack.len() {
            let Some(caps) = self.regex.captures_at(haystack, pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            pos = whole.end();
            if whole.is_empty() {
                pos += haystack[pos..].chars().next().map_or(1, char::len_utf8);
            }
            found.push(caps);
            if !self.flags.global {
                break;
            }
        }
        found
    }
}

/// `\/` is how a literal slash is written inside a delimited literal.
fn unescape_slashes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('/') => out.push('/'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_pattern_and_flags_at_last_slash() {
        let re = CompiledRegex::parse("/a/b/gi").expect("valid literal");
        assert!(re.is_global());
        assert!(re.flags().case_insensitive);
        assert!(re.regex().is_match("A/B"));
        assert_eq!(re.flags().to_string(), "gi");
    }

    #[test]
    fn no_flags_is_single_shot() {
        let re = CompiledRegex::parse("/([0-9]+)/").expect("valid literal");
        assert!(!re.is_global());
        assert_eq!(re.literal(), "/([0-9]+)/");
    }

    #[test]
    fn escaped_slash_matches_slash() {
        let re = CompiledRegex::parse(r"/https?:\/\/(\w+)/").expect("valid literal");
        assert!(re.regex().is_match("https://example"));
        let re = CompiledRegex::parse(r"/a\\/").expect("escaped backslash");
        assert!(re.regex().is_match(r"a\"));
    }

    #[test]
    fn empty_match_after_a_match_is_kept() {
        let re = CompiledRegex::parse("/a*/g").expect("valid literal");
        let spans: Vec<_> = re
            .captures_all("baaac")
            .iter()
            .filter_map(|caps| caps.get(0))
            .map(|m| (m.start(), m.end()))
            .collect();
        assert_eq!(spans, [(0, 0), (1, 4), (4, 4), (5, 5)]);
    }

    #[test]
    fn empty_matches_step_over_multibyte_chars() {
        let re = CompiledRegex::parse("/x*/g").expect("valid literal");
        assert_eq!(re.captures_all("é").len(), 2);
        let first = CompiledRegex::parse("/x*/").expect("valid literal");
        assert_eq!(first.captures_all("é").len(), 1);
    }

    #[test]
    fn rejects_malformed_literals() {
        for literal in ["abc", "/abc", "", "/(/", "/a/q", "/a/gg", "/a/y"] {
            let err = CompiledRegex::parse(literal).expect_err(literal);
            assert!(matches!(err, TtvError::Pattern { .. }), "{literal}: {err:?}");
        }
    }

    #[test]
    fn oversized_literal_hits_limit() {
        let limits = ResourceLimiter {
            max_pattern_length: 8,
            ..ResourceLimiter::default()
        };
        let err = CompiledRegex::parse_with_limits("/aaaaaaaaaa/", &limits).expect_err("too long");
        assert!(matches!(err, TtvError::ResourceLimit(_)));
    }
}

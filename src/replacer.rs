//! Ordered regex substitution ("replacers").

use regex::Captures;

use crate::error::TtvResult;
use crate::regex_literal::CompiledRegex;
use crate::resource::ResourceLimiter;

#[derive(Clone, Debug, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    Group(usize),
    Named(String),
    WholeMatch,
    Before,
    After,
}

/// A replacement string such as `"$2 ($1)"`, parsed against the regex it is used with.
///
/// Supports `$1`..`$99`, `$<name>`, `$&`, `` $` ``, `$'` and `$$`. A `$n` naming a
/// group the regex does not have is kept as literal text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplacementTemplate {
    parts: Vec<TemplatePart>,
}

impl ReplacementTemplate {
    pub fn parse(template: &str, regex: &CompiledRegex) -> Self {
        let group_count = regex.regex().captures_len() - 1;
        let has_names = regex.regex().capture_names().flatten().next().is_some();
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = template;
        while let Some(dollar) = rest.find('$') {
            literal.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];
            let (part, consumed) = match after.as_bytes().first() {
                Some(b'$') => (None, 1),
                Some(b'&') => (Some(TemplatePart::WholeMatch), 1),
                Some(b'`') => (Some(TemplatePart::Before), 1),
                Some(b'\'') => (Some(TemplatePart::After), 1),
                Some(b'<') if has_names => match after.find('>') {
                    Some(close) => (Some(TemplatePart::Named(after[1..close].to_string())), close + 1),
                    None => (None, 0),
                },
                Some(digit) if digit.is_ascii_digit() => {
                    match group_reference(after.as_bytes(), group_count) {
                        Some((index, len)) => (Some(TemplatePart::Group(index)), len),
                        None => (None, 0),
                    }
                }
                _ => (None, 0),
            };
            match part {
                Some(part) => {
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(part);
                }
                // `$$` and any `$` that does not start a reference.
                None => literal.push('$'),
            }
            rest = &after[consumed..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }
        Self { parts }
    }

    fn expand(&self, caps: &Captures<'_>, haystack: &str, out: &mut String) {
        let whole = caps.get(0);
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Group(index) => {
                    out.push_str(caps.get(*index).map_or("", |m| m.as_str()))
                }
                TemplatePart::Named(name) => {
                    out.push_str(caps.name(name).map_or("", |m| m.as_str()))
                }
                TemplatePart::WholeMatch => out.push_str(whole.map_or("", |m| m.as_str())),
                TemplatePart::Before => {
                    out.push_str(whole.map_or("", |m| &haystack[..m.start()]))
                }
                TemplatePart::After => out.push_str(whole.map_or("", |m| &haystack[m.end()..])),
            }
        }
    }
}

/// Two digits win when they name an existing group, otherwise one digit does.
fn group_reference(digits: &[u8], group_count: usize) -> Option<(usize, usize)> {
    let first = usize::from(digits.first()?.checked_sub(b'0')?);
    if let Some(second) = digits.get(1).filter(|byte| byte.is_ascii_digit()) {
        let index = first * 10 + usize::from(second - b'0');
        if (1..=group_count).contains(&index) {
            return Some((index, 2));
        }
    }
    if (1..=group_count).contains(&first) {
        Some((first, 1))
    } else {
        None
    }
}

#[derive(Clone, Debug)]
pub struct ReplaceRule {
    regex: CompiledRegex,
    template: ReplacementTemplate,
}

impl ReplaceRule {
    pub fn new(regex: CompiledRegex, template: &str) -> Self {
        let template = ReplacementTemplate::parse(template, &regex);
        Self { regex, template }
    }

    /// Replaces the first match, or every match for a global regex.
    pub fn apply(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut last_end = 0;
        for caps in self.regex.captures_all(input) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&input[last_end..whole.start()]);
            self.template.expand(&caps, input, &mut out);
            last_end = whole.end();
        }
        out.push_str(&input[last_end..]);
        out
    }
}

/// A named, ordered list of substitutions; each rule runs on the previous rule's output.
#[derive(Clone, Debug, Default)]
pub struct Replacer {
    rules: Vec<ReplaceRule>,
}

impl Replacer {
    pub fn new(rules: Vec<ReplaceRule>) -> Self {
        Self { rules }
    }

    /// Compiles `(regex literal, replacement)` pairs in order.
    pub fn compile(pairs: &[(String, String)], limits: &ResourceLimiter) -> TtvResult<Self> {
        let rules = pairs
            .iter()
            .map(|(literal, template)| {
                let regex = CompiledRegex::parse_with_limits(literal, limits)?;
                Ok(ReplaceRule::new(regex, template))
            })
            .collect::<TtvResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn apply(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |text, rule| rule.apply(&text))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/replacer_tests.rs"]
mod tests;

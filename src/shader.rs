//! Shaders: named regexes whose matches are extracted as structured records.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::trace;

use crate::regex_literal::CompiledRegex;

/// One regex match: index 0 is the whole match, then each capture group.
/// Groups that did not take part in the match are `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchRecord(pub Vec<Option<String>>);

impl MatchRecord {
    pub fn group(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|group| group.as_deref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Shader {
    regex: CompiledRegex,
}

impl Shader {
    pub fn new(regex: CompiledRegex) -> Self {
        Self { regex }
    }

    /// Every match for a global regex, otherwise at most the first.
    /// Searching always starts at the beginning of `input`.
    pub fn run(&self, input: &str) -> Vec<MatchRecord> {
        self.regex
            .captures_all(input)
            .into_iter()
            .map(|caps| {
                MatchRecord(
                    caps.iter()
                        .map(|group| group.map(|m| m.as_str().to_string()))
                        .collect(),
                )
            })
            .collect()
    }

    pub fn regex(&self) -> &CompiledRegex {
        &self.regex
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShaderCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// The shaders of one compiled view and the memoized results of running them.
///
/// Results are kept per shader name, then per input text, and live as long as
/// the table, so reloading a view starts from an empty cache.
#[derive(Debug, Default)]
pub struct ShaderTable {
    shaders: BTreeMap<String, Shader>,
    cache: RefCell<HashMap<String, HashMap<String, Arc<[MatchRecord]>>>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl ShaderTable {
    pub fn new(shaders: BTreeMap<String, Shader>) -> Self {
        Self {
            shaders,
            ..Self::default()
        }
    }

    pub fn get(&self, name: &str) -> Option<&Shader> {
        self.shaders.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shaders.keys().map(String::as_str)
    }

    /// Runs shader `name` over `input`, reusing an earlier result for the same pair.
    /// Returns `None` for an unknown shader.
    pub fn matches(&self, name: &str, input: &str) -> Option<Arc<[MatchRecord]>> {
        let shader = self.shaders.get(name)?;
        let cached = self
            .cache
            .borrow()
            .get(name)
            .and_then(|inputs| inputs.get(input))
            .map(Arc::clone);
        if let Some(records) = cached {
            self.hits.set(self.hits.get() + 1);
            trace!(shader = name, "shader cache hit");
            return Some(records);
        }
        self.misses.set(self.misses.get() + 1);
        trace!(shader = name, input_len = input.len(), "shader cache miss");
        let records: Arc<[MatchRecord]> = shader.run(input).into();
        self.cache
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .insert(input.to_string(), Arc::clone(&records));
        Some(records)
    }

    /// Group `group` of match `index`, or `None` when anything is out of range.
    pub fn extract(&self, name: &str, input: &str, index: usize, group: usize) -> Option<String> {
        let records = self.matches(name, input)?;
        records
            .get(index)
            .and_then(|record| record.group(group))
            .map(str::to_string)
    }

    pub fn stats(&self) -> ShaderCacheStats {
        ShaderCacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries: self.cache.borrow().values().map(HashMap::len).sum(),
        }
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

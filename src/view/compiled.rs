use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::error::TtvResult;
use crate::evaluator::{ArticleState, EvalContext};
use crate::hyperlink::link_urls;
use crate::markup::Article;
use crate::operators::OperatorTable;
use crate::policy::ViewPolicy;
use crate::regex_literal::CompiledRegex;
use crate::replacer::Replacer;
use crate::resource::ResourceLimiter;
use crate::shader::{Shader, ShaderCacheStats, ShaderTable};
use crate::token::{Line, TokenParser};

use super::raw::{VarValue, ViewRaw};

/// A view ready to render: regexes compiled, tokens parsed, operators resolved.
///
/// Built once per view load and reused for every event. Shader results are
/// memoized for the lifetime of this value.
#[derive(Debug)]
pub struct ViewCompiled {
    title: String,
    variables: BTreeMap<String, VarValue>,
    replacers: BTreeMap<String, Replacer>,
    shaders: ShaderTable,
    article: Vec<Line>,
    operators: OperatorTable,
    policy: ViewPolicy,
}

impl ViewCompiled {
    /// Validates and compiles a raw view with the built-in operators.
    pub fn new(raw: &ViewRaw, policy: ViewPolicy, limits: ResourceLimiter) -> TtvResult<Self> {
        Self::with_operators(raw, policy, limits, OperatorTable::builtin())
    }

    /// Parses, validates and compiles a JSON view definition in one step.
    pub fn from_json(input: &str, policy: ViewPolicy, limits: ResourceLimiter) -> TtvResult<Self> {
        let raw = ViewRaw::from_json_with_limits(input, &limits)?;
        Self::new(&raw, policy, limits)
    }

    /// Compiles a raw view against a custom operator table.
    ///
    /// Any invalid regex literal fails the whole view.
    #[instrument(skip_all, fields(title = raw.resolved_title()))]
    pub fn with_operators(
        raw: &ViewRaw,
        policy: ViewPolicy,
        limits: ResourceLimiter,
        operators: OperatorTable,
    ) -> TtvResult<Self> {
        policy.validate_raw(raw, &limits)?;

        let replacers = raw
            .replacers
            .iter()
            .map(|(name, pairs)| Ok((name.clone(), Replacer::compile(pairs, &limits)?)))
            .collect::<TtvResult<BTreeMap<_, _>>>()?;

        let shaders = raw
            .shaders
            .iter()
            .map(|(name, literal)| {
                let regex = CompiledRegex::parse_with_limits(literal, &limits)?;
                Ok((name.clone(), Shader::new(regex)))
            })
            .collect::<TtvResult<BTreeMap<_, _>>>()?;

        let parser = TokenParser {
            operators: &operators,
            policy: &policy,
            limits: &limits,
        };
        let article = raw
            .article
            .iter()
            .map(|line| parser.parse_line(line))
            .collect::<TtvResult<Vec<_>>>()?;

        debug!(
            replacers = replacers.len(),
            shaders = shaders.len(),
            lines = article.len(),
            "compiled view"
        );

        Ok(Self {
            title: raw.resolved_title().to_string(),
            variables: raw.variables.clone(),
            replacers,
            shaders: ShaderTable::new(shaders),
            article,
            operators,
            policy,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn variables(&self) -> &BTreeMap<String, VarValue> {
        &self.variables
    }

    pub fn replacer(&self, name: &str) -> Option<&Replacer> {
        self.replacers.get(name)
    }

    pub fn shaders(&self) -> &ShaderTable {
        &self.shaders
    }

    pub fn lines(&self) -> &[Line] {
        &self.article
    }

    pub fn policy(&self) -> &ViewPolicy {
        &self.policy
    }

    /// Renders one article: a paragraph per line, lines and tokens in order.
    pub fn build_article(&self, state: &ArticleState<'_>) -> Article {
        let ctx = EvalContext {
            state,
            variables: &self.variables,
            replacers: &self.replacers,
            shaders: &self.shaders,
            operators: &self.operators,
        };
        let paragraphs = self
            .article
            .iter()
            .map(|line| {
                let mut paragraph = ctx.evaluate_line(line);
                if self.policy.link_urls {
                    link_urls(&mut paragraph);
                }
                paragraph
            })
            .collect();
        Article { paragraphs }
    }

    pub fn shader_cache_stats(&self) -> ShaderCacheStats {
        self.shaders.stats()
    }
}

//! 规则编译器核心
//! 将规则定义编译为可执行的匹配结构，所有配置错误在此阶段暴露

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use regex::RegexBuilder;
use tracing::{debug, trace};

use super::pattern::{
    CompiledCondition, CompiledPattern, CompiledRuleLibrary, CompiledRuleSet, CompiledTagRule,
    CompiledTerm, Matcher,
};
use crate::error::{TagResult, UrlTaggerError};
use crate::rule::{
    PatternSource, PatternSpec, RuleDefinitions, RuleSurface, SurfaceRules, TagCondition, TagTerm,
};

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 编译完整规则定义
    pub fn compile(defs: &RuleDefinitions) -> TagResult<CompiledRuleLibrary> {
        let start = Instant::now();
        let mut stats = CompileStats::default();

        // 1. 编译模式表（三个作用面共享）
        let mut patterns = Vec::with_capacity(defs.patterns.len());
        let mut index = HashMap::with_capacity(defs.patterns.len());
        for (name, source) in &defs.patterns {
            let pattern = Self::compile_pattern(name, source, &mut stats)?;
            trace!("模式 {} -> {}", pattern.name, pattern.matcher.describe());
            index.insert(name.as_str(), patterns.len());
            patterns.push(pattern);
        }
        let patterns = Arc::new(patterns);

        // 2. 逐作用面解析标签条件
        let url = Self::compile_surface(RuleSurface::Url, &defs.rules.url, &patterns, &index)?;
        let html = Self::compile_surface(RuleSurface::Html, &defs.rules.html, &patterns, &index)?;
        let content =
            Self::compile_surface(RuleSurface::Content, &defs.rules.content, &patterns, &index)?;

        debug!("✅ 规则编译完成，总耗时{:?}", start.elapsed());
        debug!(
            "📊 编译统计：正则模式{}条、子串模式{}条、URL标签{}个、HTML标签{}个、正文标签{}个",
            stats.regex_count,
            stats.contains_count,
            url.rules.len(),
            html.rules.len(),
            content.rules.len()
        );

        Ok(CompiledRuleLibrary { url, html, content })
    }

    /// 编译单个作用面
    pub fn compile_surface(
        surface: RuleSurface,
        rules: &SurfaceRules,
        patterns: &Arc<Vec<CompiledPattern>>,
        index: &HashMap<&str, usize>,
    ) -> TagResult<CompiledRuleSet> {
        let mut compiled_rules = Vec::with_capacity(rules.len());

        for (tag, definition) in rules {
            let conditions = definition
                .to_conditions(tag)?
                .iter()
                .map(|cond| Self::resolve_condition(tag, cond, index))
                .collect::<TagResult<Vec<_>>>()?;

            compiled_rules.push(CompiledTagRule {
                tag: tag.clone(),
                conditions,
            });
        }

        Ok(CompiledRuleSet {
            surface,
            patterns: Arc::clone(patterns),
            rules: compiled_rules,
        })
    }

    fn resolve_condition(
        tag: &str,
        cond: &TagCondition,
        index: &HashMap<&str, usize>,
    ) -> TagResult<CompiledCondition> {
        match cond {
            TagCondition::Term(term) => Ok(CompiledCondition::Term(Self::resolve_term(tag, term, index)?)),
            TagCondition::AllOf(terms) => terms
                .iter()
                .map(|term| Self::resolve_term(tag, term, index))
                .collect::<TagResult<Vec<_>>>()
                .map(CompiledCondition::AllOf),
        }
    }

    fn resolve_term(tag: &str, term: &TagTerm, index: &HashMap<&str, usize>) -> TagResult<CompiledTerm> {
        let name = term.pattern_name();
        let Some(&idx) = index.get(name) else {
            return Err(UrlTaggerError::UnknownPattern {
                tag: tag.to_string(),
                pattern: name.to_string(),
            });
        };

        Ok(match term {
            TagTerm::Atom(_) => CompiledTerm::Atom(idx),
            TagTerm::Negated(_) => CompiledTerm::Negated(idx),
        })
    }

    /// 编译单个原子模式（忽略大小写）
    fn compile_pattern(
        name: &str,
        source: &PatternSource,
        stats: &mut CompileStats,
    ) -> TagResult<CompiledPattern> {
        let matcher = match source {
            PatternSource::Regex(raw) | PatternSource::Explicit(PatternSpec::Regex(raw)) => {
                let regex = RegexBuilder::new(raw).case_insensitive(true).build()?;
                stats.regex_count += 1;
                Matcher::Regex(regex)
            }
            PatternSource::Explicit(PatternSpec::Contains(literal)) => {
                if literal.is_empty() {
                    return Err(UrlTaggerError::RuleParseError(format!(
                        "模式 {} 的子串为空",
                        name
                    )));
                }
                stats.contains_count += 1;
                Matcher::Contains(literal.to_lowercase())
            }
        };

        Ok(CompiledPattern {
            name: name.to_string(),
            matcher,
        })
    }
}

/// 编译统计信息
#[derive(Debug, Clone, Default)]
struct CompileStats {
    regex_count: usize,
    contains_count: usize,
}

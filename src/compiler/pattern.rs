//! 编译后模式模型
//! 正则编译后的结构与逐标签求值逻辑

use std::collections::BTreeMap;
use std::sync::Arc;
use once_cell::unsync::OnceCell;
use regex::Regex;

use crate::rule::RuleSurface;

#[derive(Debug, Clone)]
pub enum Matcher {
    Contains(String), // 包含匹配（忽略大小写，已转小写）
    Regex(Regex),     // 正则匹配（编译时已开启忽略大小写）
}

impl Matcher {
    /// 规则描述
    pub fn describe(&self) -> &str {
        match self {
            Matcher::Contains(s) => s,
            Matcher::Regex(r) => r.as_str(),
        }
    }
}

/// 编译后的原子模式
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub name: String,
    pub matcher: Matcher,
}

/// 条件项，下标指向模式表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompiledTerm {
    Atom(usize),
    Negated(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledCondition {
    Term(CompiledTerm),
    AllOf(Vec<CompiledTerm>),
}

/// 单个标签编译后的规则
#[derive(Debug, Clone)]
pub struct CompiledTagRule {
    pub tag: String,
    pub conditions: Vec<CompiledCondition>,
}

/// 单个作用面编译后的规则集
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    pub surface: RuleSurface,
    pub patterns: Arc<Vec<CompiledPattern>>,
    pub rules: Vec<CompiledTagRule>,
}

impl CompiledRuleSet {
    /// 对目标文本求值，返回有序的 标签 -> 是否命中
    pub fn run(&self, target: &str) -> BTreeMap<String, bool> {
        let mut ctx = MatchContext::new(target, self.patterns.len());
        self.rules
            .iter()
            .map(|rule| {
                let hit = rule.conditions.iter().any(|cond| ctx.condition(&self.patterns, cond));
                (rule.tag.clone(), hit)
            })
            .collect()
    }

    /// 命中的标签（字典序）
    pub fn matched(&self, target: &str) -> Vec<String> {
        self.run(target)
            .into_iter()
            .filter_map(|(tag, hit)| hit.then_some(tag))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// 单次求值上下文：缓存模式命中结果与小写目标串
struct MatchContext<'a> {
    target: &'a str,
    lowered: OnceCell<String>,
    hits: Vec<Option<bool>>,
}

impl<'a> MatchContext<'a> {
    fn new(target: &'a str, pattern_count: usize) -> Self {
        Self {
            target,
            lowered: OnceCell::new(),
            hits: vec![None; pattern_count],
        }
    }

    fn condition(&mut self, patterns: &[CompiledPattern], cond: &CompiledCondition) -> bool {
        match cond {
            CompiledCondition::Term(term) => self.term(patterns, *term),
            CompiledCondition::AllOf(terms) => terms.iter().all(|term| self.term(patterns, *term)),
        }
    }

    fn term(&mut self, patterns: &[CompiledPattern], term: CompiledTerm) -> bool {
        match term {
            CompiledTerm::Atom(idx) => self.pattern(patterns, idx),
            CompiledTerm::Negated(idx) => !self.pattern(patterns, idx),
        }
    }

    fn pattern(&mut self, patterns: &[CompiledPattern], idx: usize) -> bool {
        if let Some(hit) = self.hits[idx] {
            return hit;
        }
        let hit = match &patterns[idx].matcher {
            Matcher::Regex(regex) => regex.is_match(self.target),
            Matcher::Contains(literal) => {
                let target = self.target;
                self.lowered.get_or_init(|| target.to_lowercase()).contains(literal.as_str())
            }
        };
        self.hits[idx] = Some(hit);
        hit
    }
}

/// 编译后的三面规则库
#[derive(Debug, Clone)]
pub struct CompiledRuleLibrary {
    pub url: CompiledRuleSet,
    pub html: CompiledRuleSet,
    pub content: CompiledRuleSet,
}

impl CompiledRuleLibrary {
    pub fn get(&self, surface: RuleSurface) -> &CompiledRuleSet {
        match surface {
            RuleSurface::Url => &self.url,
            RuleSurface::Html => &self.html,
            RuleSurface::Content => &self.content,
        }
    }
}

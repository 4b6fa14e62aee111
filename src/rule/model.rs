//! 规则数据模型定义
//! 存储原始规则数据与标签条件结构，支持序列化/反序列化

use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};

use crate::error::{TagResult, UrlTaggerError};

/// 取反前缀
pub const NEGATION_PREFIX: char = '!';

/// 规则作用面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleSurface {
    /// URL 字符串本身
    Url,
    /// 抓取到的原始 HTML
    Html,
    /// 从 HTML 提取的纯文本
    Content,
}

impl RuleSurface {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSurface::Url => "url",
            RuleSurface::Html => "html",
            RuleSurface::Content => "content",
        }
    }
}

impl fmt::Display for RuleSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 原子模式来源：字符串视为正则，也可显式声明正则或子串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSource {
    Regex(String),
    Explicit(PatternSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSpec {
    Regex(String),
    Contains(String),
}

impl From<&str> for PatternSource {
    fn from(value: &str) -> Self {
        PatternSource::Regex(value.to_string())
    }
}

/// 原始标签定义：单个条件或条件列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTagDefinition {
    Single(String),
    List(Vec<RawTagElement>),
}

/// 原始条件元素：模式名（可带 `!`）或合取分组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTagElement {
    Name(String),
    Group(Vec<RawTagElement>),
}

/// 单个作用面的规则：标签名 -> 原始定义
pub type SurfaceRules = BTreeMap<String, RawTagDefinition>;

/// 三个作用面的规则集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceRuleMap {
    #[serde(default)]
    pub url: SurfaceRules,
    #[serde(default)]
    pub content: SurfaceRules,
    #[serde(default)]
    pub html: SurfaceRules,
}

impl SurfaceRuleMap {
    pub fn get(&self, surface: RuleSurface) -> &SurfaceRules {
        match surface {
            RuleSurface::Url => &self.url,
            RuleSurface::Html => &self.html,
            RuleSurface::Content => &self.content,
        }
    }

    fn get_mut(&mut self, surface: RuleSurface) -> &mut SurfaceRules {
        match surface {
            RuleSurface::Url => &mut self.url,
            RuleSurface::Html => &mut self.html,
            RuleSurface::Content => &mut self.content,
        }
    }
}

/// 完整规则定义（构建后不可变）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinitions {
    #[serde(default)]
    pub patterns: BTreeMap<String, PatternSource>,
    #[serde(default)]
    pub rules: SurfaceRuleMap,
}

impl RuleDefinitions {
    pub fn new(patterns: BTreeMap<String, PatternSource>, rules: SurfaceRuleMap) -> Self {
        Self { patterns, rules }
    }

    /// 添加正则模式
    pub fn pattern(mut self, name: &str, source: impl Into<PatternSource>) -> Self {
        self.patterns.insert(name.to_string(), source.into());
        self
    }

    /// 添加子串模式
    pub fn contains_pattern(mut self, name: &str, literal: &str) -> Self {
        self.patterns.insert(
            name.to_string(),
            PatternSource::Explicit(PatternSpec::Contains(literal.to_string())),
        );
        self
    }

    /// 添加标签定义
    pub fn rule(mut self, surface: RuleSurface, tag: &str, definition: RawTagDefinition) -> Self {
        self.rules.get_mut(surface).insert(tag.to_string(), definition);
        self
    }
}

/// 条件项：模式名或取反的模式名
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagTerm {
    Atom(String),
    Negated(String),
}

impl TagTerm {
    /// 解析 `name` / `!name`
    pub fn parse(tag: &str, raw: &str) -> TagResult<Self> {
        let raw = raw.trim();
        let (term, name) = match raw.strip_prefix(NEGATION_PREFIX) {
            Some(name) => (TagTerm::Negated(name.trim().to_string()), name.trim()),
            None => (TagTerm::Atom(raw.to_string()), raw),
        };
        if name.is_empty() {
            return Err(UrlTaggerError::RuleParseError(format!(
                "标签 {} 含空模式名",
                tag
            )));
        }
        Ok(term)
    }

    pub fn pattern_name(&self) -> &str {
        match self {
            TagTerm::Atom(name) | TagTerm::Negated(name) => name,
        }
    }
}

/// 标签条件：任一条件成立即命中；`AllOf` 要求全部成立
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagCondition {
    Term(TagTerm),
    AllOf(Vec<TagTerm>),
}

impl RawTagDefinition {
    /// 转换为结构化条件列表
    pub fn to_conditions(&self, tag: &str) -> TagResult<Vec<TagCondition>> {
        match self {
            RawTagDefinition::Single(name) => Ok(vec![TagCondition::Term(TagTerm::parse(tag, name)?)]),
            RawTagDefinition::List(elements) => elements
                .iter()
                .map(|element| element.to_condition(tag))
                .collect(),
        }
    }
}

impl RawTagElement {
    fn to_condition(&self, tag: &str) -> TagResult<TagCondition> {
        match self {
            RawTagElement::Name(name) => Ok(TagCondition::Term(TagTerm::parse(tag, name)?)),
            RawTagElement::Group(members) => {
                if members.is_empty() {
                    return Err(UrlTaggerError::RuleParseError(format!(
                        "标签 {} 含空的合取分组",
                        tag
                    )));
                }
                let terms = members
                    .iter()
                    .map(|member| match member {
                        RawTagElement::Name(name) => TagTerm::parse(tag, name),
                        RawTagElement::Group(_) => Err(UrlTaggerError::RuleParseError(format!(
                            "标签 {} 的合取分组不支持嵌套",
                            tag
                        ))),
                    })
                    .collect::<TagResult<Vec<_>>>()?;
                Ok(TagCondition::AllOf(terms))
            }
        }
    }
}

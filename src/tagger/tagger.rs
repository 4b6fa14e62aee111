//! 打标器核心：整合规则求值、内容抓取与正文提取，输出标签列表
use std::sync::Arc;

use tracing::debug;

use super::analyzer::{DocumentAnalyzer, SurfaceAnalyzer};
use crate::compiler::{CompiledRuleLibrary, RuleCompiler};
use crate::config::TaggerConfig;
use crate::error::TagResult;
use crate::extractor::ContentExtractor;
use crate::fetcher::{ContentCache, ContentFetcher};
use crate::rule::{RuleDefinitions, RuleSurface};
use crate::utils::TagMerger;

/// URL 打标器（构建一次，可并发复用）
#[derive(Clone)]
pub struct UrlTagger {
    compiled_lib: Arc<CompiledRuleLibrary>,
    fetcher: ContentFetcher,
    extractor: ContentExtractor,
}

impl UrlTagger {
    /// 创建打标器，规则配置错误在此返回
    pub fn new(defs: &RuleDefinitions, config: TaggerConfig) -> TagResult<Self> {
        // 1. 编译规则
        let compiled_lib = RuleCompiler::compile(defs)?;

        // 2. 抓取器与提取器
        let fetcher = ContentFetcher::new(&config)?;
        let extractor = ContentExtractor::new(config.max_content_size);

        Ok(Self {
            compiled_lib: Arc::new(compiled_lib),
            fetcher,
            extractor,
        })
    }

    /// 使用自定义缓存后端
    pub fn with_cache(mut self, cache: Arc<dyn ContentCache>) -> Self {
        self.fetcher = self.fetcher.with_cache(cache);
        self
    }

    pub fn fetcher(&self) -> &ContentFetcher {
        &self.fetcher
    }

    /// 仅对 URL 字符串求值（同步、无 I/O）
    pub fn run_url(&self, url: &str) -> Vec<String> {
        SurfaceAnalyzer::analyze(self.compiled_lib.get(RuleSurface::Url), url)
    }

    /// 抓取内容，对原始 HTML 与提取的正文求值（HTML 标签在前）
    pub async fn run_content(&self, url: &str) -> TagResult<Vec<String>> {
        let html = self.fetcher.fetch_content(url).await?;
        Ok(self.tag_document(&html))
    }

    /// 完整流程：URL 标签与内容标签合并、排序、去重
    pub async fn run(&self, url: &str) -> TagResult<Vec<String>> {
        let url_tags = self.run_url(url);
        let content_tags = self.run_content(url).await?;

        let tags = TagMerger::merge([url_tags, content_tags]);
        debug!("打标完成：{} -> {:?}", url, tags);
        Ok(tags)
    }

    /// 对已获取的文档求值（HTML 规则 + 正文规则）
    ///
    /// 空文档或提取结果为空时对应作用面不产生标签。
    pub fn tag_document(&self, html: &str) -> Vec<String> {
        let mut tags = DocumentAnalyzer::analyze(self.compiled_lib.get(RuleSurface::Html), html);

        let content_rules = self.compiled_lib.get(RuleSurface::Content);
        if !content_rules.is_empty() {
            let text = self.extractor.extract(html);
            tags.extend(DocumentAnalyzer::analyze(content_rules, &text));
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tagger(defs: serde_json::Value, config: TaggerConfig) -> UrlTagger {
        let defs: RuleDefinitions = serde_json::from_value(defs).unwrap();
        UrlTagger::new(&defs, config).unwrap()
    }

    #[test]
    fn test_run_url_pure() {
        let tagger = tagger(
            json!({
                "patterns": { "contains-github": "//github.com/", "is-https": "^https://" },
                "rules": { "url": {
                    "github": ["contains-github"],
                    "not-https": ["!is-https"],
                    "github-not-https": [["!is-https", "contains-github"]]
                } }
            }),
            TaggerConfig::default(),
        );

        let first = tagger.run_url("http://github.com/mheap");
        assert_eq!(first, vec!["github", "github-not-https", "not-https"]);
        assert_eq!(tagger.run_url("http://github.com/mheap"), first);
        assert_eq!(tagger.run_url("https://github.com/mheap"), vec!["github"]);
        assert!(tagger.run_url("https://google.com").is_empty());
    }

    #[test]
    fn test_tag_document_html_then_content() {
        let tagger = tagger(
            json!({
                "patterns": { "meta-gen": "<meta name=\"generator\"", "teach": "like to teach" },
                "rules": {
                    "html": { "has-generator": "meta-gen" },
                    "content": { "teacher": ["teach"] }
                }
            }),
            TaggerConfig::default(),
        );

        let html = r#"<meta name="generator" content="x"><p>I like to teach</p>"#;
        assert_eq!(tagger.tag_document(html), vec!["has-generator", "teacher"]);
    }

    #[test]
    fn test_tag_document_oversized_skips_content_rules() {
        let config = crate::config::ConfigManager::custom().max_content_size(16).build();
        let tagger = tagger(
            json!({
                "patterns": { "any": "." },
                "rules": { "html": { "html-any": "any" }, "content": { "content-any": "any" } }
            }),
            config,
        );

        let html = format!("<p>{}</p>", "a".repeat(64));
        assert_eq!(tagger.tag_document(&html), vec!["html-any"]);
        assert_eq!(tagger.tag_document("<p>short</p>"), vec!["html-any", "content-any"]);
    }

    #[test]
    fn test_empty_document_suppresses_negated_rules() {
        let tagger = tagger(
            json!({
                "patterns": { "p": "needle" },
                "rules": {
                    "url": { "url-no-needle": "!p" },
                    "html": { "html-no-needle": "!p" },
                    "content": { "content-no-needle": "!p" }
                }
            }),
            TaggerConfig::default(),
        );

        assert!(tagger.tag_document("").is_empty());
        assert_eq!(tagger.tag_document("hay"), vec!["html-no-needle", "content-no-needle"]);
        assert_eq!(tagger.run_url("https://hay.example"), vec!["url-no-needle"]);
    }

    #[test]
    fn test_construction_error() {
        let defs: RuleDefinitions = serde_json::from_value(json!({
            "patterns": {},
            "rules": { "url": { "t": ["nope"] } }
        }))
        .unwrap();
        assert!(UrlTagger::new(&defs, TaggerConfig::default()).is_err());
    }
}

//! url-tagger - 基于正则规则的 URL 打标工具
//!
//! 分别对 URL 字符串、原始 HTML、提取后的正文执行三组规则，合并为有序去重的标签列表。

// 导出全局错误类型
pub use self::error::{TagResult, UrlTaggerError};

// 导出配置模块
pub use self::config::{
    CacheConfig, ConfigManager, CustomConfigBuilder, SettingsSource, TaggerConfig,
    CACHE_TTL_SECS, DEFAULT_MAX_CONTENT_SIZE, DEFAULT_MEMORY_CACHE_ENTRIES, MAX_CONTENT_SIZE_KEY,
};

// 导出规则模块核心接口
pub use self::rule::{
    PatternSource, PatternSpec, RawTagDefinition, RawTagElement, RuleDefinitions, RuleLoader,
    RuleSurface, SurfaceRuleMap, TagCondition, TagTerm,
};

// 导出编译模块核心接口
pub use self::compiler::{CompiledRuleLibrary, CompiledRuleSet, RuleCompiler};

// 导出抓取模块核心接口
pub use self::fetcher::{
    CacheLookup, ContentCache, ContentFetcher, FileCache, MemoryCache, cache_key,
};

// 导出提取模块核心接口
pub use self::extractor::{ContentExtractor, HtmlTextExtractor};

// 导出工具模块核心接口
pub use self::utils::TagMerger;

// 导出打标模块核心接口
pub use self::tagger::{UrlTagger, global_tagger, init_global_tagger, tag_url, tag_url_only};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod compiler;
pub mod fetcher;
pub mod extractor;
pub mod utils;
pub mod tagger;

//! 全局配置管理,存储所有可配置项
//!
//! 配置只在构建打标器时解析一次；环境变量由调用方（如命令行入口）读取，
//! 通过 [`SettingsSource`] 注入。

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{TagResult, UrlTaggerError};

/// 最大内容长度的设置项名称
pub const MAX_CONTENT_SIZE_KEY: &str = "URL_TAGGER_MAX_CONTENT_SIZE";

/// 默认最大内容长度（3MiB）
pub const DEFAULT_MAX_CONTENT_SIZE: usize = 3 * 1024 * 1024;

/// 未配置缓存时的请求超时（秒）
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// 缓存条目固定存活时间（秒）
pub const CACHE_TTL_SECS: u64 = 86_400;

/// 进程内缓存的默认条目上限
pub const DEFAULT_MEMORY_CACHE_ENTRIES: usize = 1024;

/// 内容缓存后端选择
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheConfig {
    /// 进程内缓存，条目上限为 [`DEFAULT_MEMORY_CACHE_ENTRIES`]
    Memory,
    /// 文件缓存，每个键一个 MessagePack 文件
    File { dir: PathBuf },
}

/// 打标器配置
#[derive(Debug, Clone)]
pub struct TaggerConfig {
    // 内容超过该长度（字节）时跳过正文提取
    pub max_content_size: usize,
    // 未配置缓存时的请求超时
    pub http_timeout: Duration,
    // 内容缓存（可选）
    pub cache: Option<CacheConfig>,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            cache: None,
        }
    }
}

impl TaggerConfig {
    /// 从设置源解析配置，未设置的项使用默认值
    pub fn from_settings(source: &dyn SettingsSource) -> TagResult<Self> {
        let mut config = Self::default();
        if let Some(raw) = source.get(MAX_CONTENT_SIZE_KEY) {
            config.max_content_size = parse_content_size(&raw)?;
        }
        Ok(config)
    }
}

/// 设置源（环境变量、配置文件等）
pub trait SettingsSource {
    fn get(&self, key: &str) -> Option<String>;
}

impl SettingsSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// 解析内容长度：纯数字为字节，`MiB`/`MB`/`M` 后缀为 MiB
pub fn parse_content_size(raw: &str) -> TagResult<usize> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();

    let (digits, multiplier) = ["mib", "mb", "m"]
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix).map(|d| (d.trim_end(), 1024 * 1024)))
        .unwrap_or((lower.as_str(), 1));

    let value: usize = digits.parse().map_err(|_| {
        UrlTaggerError::InvalidConfig(format!("{} 取值无效：{}", MAX_CONTENT_SIZE_KEY, trimmed))
    })?;

    value.checked_mul(multiplier).ok_or_else(|| {
        UrlTaggerError::InvalidConfig(format!("{} 取值溢出：{}", MAX_CONTENT_SIZE_KEY, trimmed))
    })
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> TaggerConfig {
        TaggerConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: TaggerConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_content_size(mut self, bytes: usize) -> Self {
        self.config.max_content_size = bytes;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn memory_cache(mut self) -> Self {
        self.config.cache = Some(CacheConfig::Memory);
        self
    }

    pub fn file_cache(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache = Some(CacheConfig::File { dir: dir.into() });
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.config.cache = None;
        self
    }

    pub fn build(self) -> TaggerConfig {
        self.config
    }
}

//! 页面内容抓取
//! 有缓存时先查缓存，未命中再抓取并回写；缓存路径内的任何失败都降级为空内容

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, warn};
use url::Url;

use super::cache::{ContentCache, build_cache};
use super::cache_key::cache_key;
use crate::config::{CACHE_TTL_SECS, TaggerConfig};
use crate::error::{TagResult, UrlTaggerError};

const DEFAULT_USER_AGENT: &str = concat!("url-tagger/", env!("CARGO_PKG_VERSION"));

/// 缓存路径的查询结果
#[derive(Debug)]
pub enum CacheLookup {
    /// 缓存命中，未发起网络请求
    Hit(String),
    /// 缓存未命中，已抓取并写回缓存
    Fetched(String),
    /// 缓存路径失败，按空内容处理
    Degraded(UrlTaggerError),
}

impl CacheLookup {
    /// 取出响应体，降级时为空字符串
    pub fn into_body(self) -> String {
        match self {
            CacheLookup::Hit(body) | CacheLookup::Fetched(body) => body,
            CacheLookup::Degraded(_) => String::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, CacheLookup::Degraded(_))
    }
}

/// 内容抓取器
#[derive(Clone)]
pub struct ContentFetcher {
    client: Client,
    cache: Option<Arc<dyn ContentCache>>,
    http_timeout: Duration,
}

impl ContentFetcher {
    /// 按配置创建抓取器（含缓存后端）
    pub fn new(config: &TaggerConfig) -> TagResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            cache: config.cache.as_ref().map(build_cache),
            http_timeout: config.http_timeout,
        })
    }

    /// 替换缓存后端
    pub fn with_cache(mut self, cache: Arc<dyn ContentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 获取 URL 的原始内容
    ///
    /// 未配置缓存时网络错误直接返回给调用方；配置缓存时不会返回错误。
    pub async fn fetch_content(&self, url: &str) -> TagResult<String> {
        match &self.cache {
            None => self.fetch_remote(url, Some(self.http_timeout)).await,
            Some(cache) => Ok(self.lookup_cached(cache.as_ref(), url).await.into_body()),
        }
    }

    /// 经缓存获取内容
    pub async fn lookup_cached(&self, cache: &dyn ContentCache, url: &str) -> CacheLookup {
        let key = cache_key(url);
        match self.try_cached(cache, &key, url).await {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!("缓存路径失败，按空内容处理：url={}，key={}，错误={}", url, key, e);
                CacheLookup::Degraded(e)
            }
        }
    }

    async fn try_cached(&self, cache: &dyn ContentCache, key: &str, url: &str) -> TagResult<CacheLookup> {
        if let Some(body) = cache.get(key).await? {
            if !body.is_empty() {
                debug!("内容缓存命中：{}（key={}）", url, key);
                return Ok(CacheLookup::Hit(body));
            }
        }

        debug!("内容缓存未命中：{}（key={}）", url, key);
        // 未命中路径沿用客户端默认超时
        let body = self.fetch_remote(url, None).await?;
        cache.set(key, &body, Duration::from_secs(CACHE_TTL_SECS)).await?;
        Ok(CacheLookup::Fetched(body))
    }

    /// 发起 GET 请求，非 2xx 视为失败
    async fn fetch_remote(&self, url: &str, timeout: Option<Duration>) -> TagResult<String> {
        let parsed = Url::parse(url)?;
        let mut request = self.client.get(parsed).header(USER_AGENT, DEFAULT_USER_AGENT);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UrlTaggerError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!("抓取完成：{}，{} 字节", url, body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_lookup_into_body() {
        assert_eq!(CacheLookup::Hit("a".to_string()).into_body(), "a");
        assert_eq!(CacheLookup::Fetched("b".to_string()).into_body(), "b");

        let degraded = CacheLookup::Degraded(UrlTaggerError::CacheError("down".to_string()));
        assert!(degraded.is_degraded());
        assert_eq!(degraded.into_body(), "");
    }

    #[tokio::test]
    async fn test_invalid_url_without_cache() {
        let fetcher = ContentFetcher::new(&TaggerConfig::default()).unwrap();
        assert!(matches!(
            fetcher.fetch_content("not a url").await,
            Err(UrlTaggerError::UrlError(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_with_cache_degrades() {
        let config = crate::config::ConfigManager::custom().memory_cache().build();
        let fetcher = ContentFetcher::new(&config).unwrap();
        assert_eq!(fetcher.fetch_content("not a url").await.unwrap(), "");
    }
}

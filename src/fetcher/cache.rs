//! 内容缓存后端
//! 键为 URL 的 MD5，值为抓取到的原始响应体；后端自行处理过期

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::{CacheConfig, DEFAULT_MEMORY_CACHE_ENTRIES};
use crate::error::{TagResult, UrlTaggerError};

/// 通用键值缓存接口
#[async_trait]
pub trait ContentCache: Send + Sync {
    /// 读取缓存，未命中或已过期返回 `None`
    async fn get(&self, key: &str) -> TagResult<Option<String>>;

    /// 写入缓存
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> TagResult<()>;
}

/// 根据配置构建缓存后端
pub fn build_cache(config: &CacheConfig) -> Arc<dyn ContentCache> {
    match config {
        CacheConfig::Memory => Arc::new(MemoryCache::new()),
        CacheConfig::File { dir } => Arc::new(FileCache::new(dir.clone())),
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    inserted_at: Instant,
    // None 表示永不过期（TTL 超出时钟范围）
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// 进程内缓存，条目数达到上限时淘汰最早写入的条目
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, MemoryEntry>>,
    max_entries: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CACHE_ENTRIES)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定条目上限（至少为 1）
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// 当前条目数（含未清理的过期条目）
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict_oldest(entries: &mut HashMap<String, MemoryEntry>) {
        if let Some(oldest_key) = entries
            .iter()
            .min_by_key(|(_, v)| v.inserted_at)
            .map(|(k, _)| k.clone())
        {
            debug!("内存缓存已满，淘汰条目：{}", oldest_key);
            entries.remove(&oldest_key);
        }
    }
}

#[async_trait]
impl ContentCache for MemoryCache {
    async fn get(&self, key: &str) -> TagResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(Instant::now()) => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
            }
        }

        // 过期条目惰性清理，写锁下重新判断是否过期
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> TagResult<()> {
        let now = Instant::now();
        let entry = MemoryEntry {
            value: value.to_string(),
            inserted_at: now,
            expires_at: now.checked_add(ttl),
        };

        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            entries.retain(|_, e| !e.is_expired(now));
            if entries.len() >= self.max_entries {
                Self::evict_oldest(&mut entries);
            }
        }
        entries.insert(key.to_string(), entry);
        Ok(())
    }
}

/// 文件缓存记录（MessagePack）
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    value: String,
    expires_at: u64,
}

/// 文件缓存：每个键对应目录下的一个 `.mp` 文件
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> TagResult<PathBuf> {
        let valid = !key.is_empty()
            && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(UrlTaggerError::CacheError(format!("非法缓存键：{}", key)));
        }
        Ok(self.dir.join(format!("{}.mp", key)))
    }

    fn unix_now() -> TagResult<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| UrlTaggerError::CacheError(format!("系统时间异常：{}", e)))
    }
}

#[async_trait]
impl ContentCache for FileCache {
    async fn get(&self, key: &str) -> TagResult<Option<String>> {
        let path = self.entry_path(key)?;
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: CacheRecord = rmp_serde::from_slice(&data)
            .map_err(|e| UrlTaggerError::MsgPackError(format!("反序列化失败：{}", e)))?;

        if record.expires_at <= Self::unix_now()? {
            debug!("缓存条目已过期：{}", path.display());
            if let Err(e) = tokio::fs::remove_file(&path).await {
                debug!("清理过期缓存失败：{}", e);
            }
            return Ok(None);
        }

        Ok(Some(record.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> TagResult<()> {
        let path = self.entry_path(key)?;
        let record = CacheRecord {
            value: value.to_string(),
            expires_at: Self::unix_now()?.saturating_add(ttl.as_secs()),
        };

        let data = rmp_serde::to_vec(&record)
            .map_err(|e| UrlTaggerError::MsgPackError(format!("序列化失败：{}", e)))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, data).await?;
        debug!("缓存写入成功：{}，{} 字节", path.display(), value.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty().await);
        assert_eq!(cache.get("k").await.unwrap(), None);

        cache.set("k", "<html>body</html>", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("<html>body</html>"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_cache_expiry() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_cache_capacity_purges_expired_first() {
        let cache = MemoryCache::with_capacity(8);
        for i in 0..100 {
            cache.set(&format!("k{}", i), "body", Duration::ZERO).await.unwrap();
        }
        assert!(cache.len().await <= 8);

        cache.set("live", "fresh", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("live").await.unwrap().as_deref(), Some("fresh"));
        assert!(cache.len().await <= 8);
    }

    #[tokio::test]
    async fn test_memory_cache_evicts_oldest_when_full() {
        let cache = MemoryCache::with_capacity(3);
        for key in ["a", "b", "c"] {
            cache.set(key, key, Duration::from_secs(60)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        // 覆盖已有键不触发淘汰
        cache.set("b", "b2", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.len().await, 3);
        assert_eq!(cache.get("a").await.unwrap().as_deref(), Some("a"));

        tokio::time::sleep(Duration::from_millis(2)).await;
        cache.set("d", "d", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.len().await, 3);
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert_eq!(cache.get("b").await.unwrap().as_deref(), Some("b2"));
        assert_eq!(cache.get("c").await.unwrap().as_deref(), Some("c"));
        assert_eq!(cache.get("d").await.unwrap().as_deref(), Some("d"));
    }

    #[tokio::test]
    async fn test_memory_cache_huge_ttl_never_expires() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::MAX).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        let dir = tempfile::tempdir().unwrap();
        let file = FileCache::new(dir.path());
        file.set("k", "v", Duration::MAX).await.unwrap();
        assert_eq!(file.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_memory_cache_concurrent_set_survives_expiry_cleanup() {
        let cache = Arc::new(MemoryCache::new());
        for _ in 0..50 {
            cache.set("k", "stale", Duration::ZERO).await.unwrap();
            let reader = {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get("k").await })
            };
            let writer = {
                let cache = cache.clone();
                tokio::spawn(async move { cache.set("k", "fresh", Duration::from_secs(60)).await })
            };
            reader.await.unwrap().unwrap();
            writer.await.unwrap().unwrap();
            assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("fresh"));
        }
    }

    #[test]
    fn test_memory_cache_zero_capacity_clamped() {
        assert_eq!(MemoryCache::with_capacity(0).capacity(), 1);
        assert_eq!(MemoryCache::new().capacity(), DEFAULT_MEMORY_CACHE_ENTRIES);
    }

    #[tokio::test]
    async fn test_file_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested"));

        assert_eq!(cache.get("abc123").await.unwrap(), None);
        cache.set("abc123", "cached body", Duration::from_secs(60)).await.unwrap();
        assert!(dir.path().join("nested").join("abc123.mp").exists());
        assert_eq!(cache.get("abc123").await.unwrap().as_deref(), Some("cached body"));
    }

    #[tokio::test]
    async fn test_file_cache_expiry_and_bad_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());

        cache.set("old", "stale", Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("old").await.unwrap(), None);
        assert!(!dir.path().join("old.mp").exists());

        assert!(matches!(
            cache.get("../escape").await,
            Err(UrlTaggerError::CacheError(_))
        ));
    }

    #[tokio::test]
    async fn test_file_cache_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.mp"), b"\xc1not msgpack").unwrap();
        let cache = FileCache::new(dir.path());

        assert!(matches!(
            cache.get("broken").await,
            Err(UrlTaggerError::MsgPackError(_))
        ));
    }

    #[tokio::test]
    async fn test_build_cache() {
        let cache = build_cache(&CacheConfig::Memory);
        cache.set("k", "v", Duration::from_secs(5)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }
}

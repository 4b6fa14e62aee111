//! 抓取模块：内容抓取、缓存后端与缓存键
pub mod cache;
pub mod cache_key;
pub mod content_fetcher;

pub use self::cache::{ContentCache, FileCache, MemoryCache, build_cache};
pub use self::cache_key::cache_key;
pub use self::content_fetcher::{CacheLookup, ContentFetcher};

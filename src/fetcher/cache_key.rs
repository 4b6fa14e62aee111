//! 缓存键计算：URL 的小写十六进制 MD5 摘要

use md5::{Digest, Md5};

/// 计算 URL 对应的缓存键
pub fn cache_key(url: &str) -> String {
    hex::encode(Md5::digest(url.as_bytes()))
}

//! 全局打标器单例管理
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::tagger::UrlTagger;
use crate::config::TaggerConfig;
use crate::error::{TagResult, UrlTaggerError};
use crate::rule::RuleDefinitions;

/// 全局打标器实例
static GLOBAL_TAGGER: Lazy<Arc<OnceCell<UrlTagger>>> = Lazy::new(|| {
    Arc::new(OnceCell::new())
});

/// 初始化全局打标器（重复调用保留首次实例）
pub async fn init_global_tagger(defs: &RuleDefinitions, config: TaggerConfig) -> TagResult<()> {
    GLOBAL_TAGGER
        .get_or_try_init(|| async { UrlTagger::new(defs, config) })
        .await?;
    Ok(())
}

/// 获取全局打标器
pub fn global_tagger() -> TagResult<&'static UrlTagger> {
    GLOBAL_TAGGER.get().ok_or(UrlTaggerError::TaggerNotInitialized)
}

/// 使用全局打标器执行完整流程
pub async fn tag_url(url: &str) -> TagResult<Vec<String>> {
    global_tagger()?.run(url).await
}

/// 使用全局打标器仅对 URL 求值
pub fn tag_url_only(url: &str) -> TagResult<Vec<String>> {
    Ok(global_tagger()?.run_url(url))
}

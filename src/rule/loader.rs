//! 规则加载管理器
//! 负责从 JSON 文本或本地文件加载规则定义

use std::path::Path;
use tracing::debug;

use super::model::RuleDefinitions;
use crate::error::TagResult;

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 从 JSON 字符串加载规则定义
    pub fn from_json_str(json: &str) -> TagResult<RuleDefinitions> {
        let defs: RuleDefinitions = serde_json::from_str(json)?;
        debug!(
            "规则定义解析成功，模式数：{}，URL规则：{}，HTML规则：{}，正文规则：{}",
            defs.patterns.len(),
            defs.rules.url.len(),
            defs.rules.html.len(),
            defs.rules.content.len()
        );
        Ok(defs)
    }

    /// 从本地 JSON 文件加载规则定义
    pub async fn load_file(path: impl AsRef<Path>) -> TagResult<RuleDefinitions> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        debug!("读取规则文件：{}，大小：{} 字节", path.display(), raw.len());
        Self::from_json_str(&raw)
    }
}

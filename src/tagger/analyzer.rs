//! 作用面分析器：对单个目标文本执行一组编译后的规则
use tracing::debug;

use crate::compiler::CompiledRuleSet;

/// 作用面分析器
pub struct SurfaceAnalyzer;

impl SurfaceAnalyzer {
    /// 返回命中的标签（字典序）
    pub fn analyze(rule_set: &CompiledRuleSet, target: &str) -> Vec<String> {
        if rule_set.is_empty() {
            return Vec::new();
        }

        let tags = rule_set.matched(target);
        if !tags.is_empty() {
            debug!("{}规则命中：{:?}", rule_set.surface, tags);
        }
        tags
    }
}

/// 文档分析器：空文档不参与求值（取反条件也不会命中）
pub struct DocumentAnalyzer;

impl DocumentAnalyzer {
    pub fn analyze(rule_set: &CompiledRuleSet, document: &str) -> Vec<String> {
        if document.is_empty() {
            return Vec::new();
        }
        SurfaceAnalyzer::analyze(rule_set, document)
    }
}

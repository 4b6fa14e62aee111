//! 提取模块：从原始 HTML 中提取可供规则匹配的纯文本
pub mod content_guard;
pub mod html_extractor;

pub use self::content_guard::ContentGuard;
pub use self::html_extractor::HtmlTextExtractor;

use tracing::debug;

/// 正文提取器：尺寸守卫 + HTML 转纯文本
#[derive(Debug, Clone, Copy)]
pub struct ContentExtractor {
    max_content_size: usize,
}

impl ContentExtractor {
    pub fn new(max_content_size: usize) -> Self {
        Self { max_content_size }
    }

    /// 提取纯文本；空内容或超限内容返回空字符串
    pub fn extract(&self, raw_body: &str) -> String {
        let guard = ContentGuard::new(self.max_content_size);
        match guard.guard(raw_body) {
            Some(body) => HtmlTextExtractor::extract(body),
            None => {
                if !raw_body.is_empty() {
                    debug!(
                        "内容长度 {} 超过上限 {}，跳过正文提取",
                        raw_body.len(),
                        guard.max_len()
                    );
                }
                String::new()
            }
        }
    }
}

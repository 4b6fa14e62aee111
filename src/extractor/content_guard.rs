/// 内容输入守卫：在正文提取前判定输入是否「值得提取」
/// 超限内容直接跳过而非截断，不视为错误
pub struct ContentGuard {
    max_len: usize,
}

impl ContentGuard {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// 通过校验返回原内容
    #[inline(always)]
    pub fn guard<'a>(&self, body: &'a str) -> Option<&'a str> {
        // 1. 空输入：无需提取
        if body.is_empty() {
            return None;
        }

        // 2. 超长保护（按字节计）
        if body.len() > self.max_len {
            return None;
        }

        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard() {
        let guard = ContentGuard::new(8);
        assert_eq!(guard.guard(""), None);
        assert_eq!(guard.guard("12345678"), Some("12345678"));
        assert_eq!(guard.guard("123456789"), None);
        // 多字节字符按字节计
        assert_eq!(guard.guard("ééééé"), None);
    }
}

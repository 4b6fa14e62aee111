//! 标签结果合并工具
//! 拼接各作用面的标签，排序并去重

/// 标签合并工具
pub struct TagMerger;

impl TagMerger {
    /// 拼接多组标签，字典序排序后去重
    pub fn merge<I>(groups: I) -> Vec<String>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut tags: Vec<String> = groups.into_iter().flatten().collect();
        tags.sort();
        tags.dedup();
        tags
    }
}

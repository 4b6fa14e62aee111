//! 工具模块
pub mod tag_merger;

pub use self::tag_merger::TagMerger;

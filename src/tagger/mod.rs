//! 打标模块：打标流程编排
pub mod global;
pub mod analyzer;
pub mod tagger;

// 导出核心接口
pub use self::global::{global_tagger, init_global_tagger, tag_url, tag_url_only};
pub use self::analyzer::{DocumentAnalyzer, SurfaceAnalyzer};
pub use self::tagger::UrlTagger;

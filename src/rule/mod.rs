//! 规则模块：负责规则定义的数据模型与加载
pub mod model;
pub mod loader;

// 导出核心接口
pub use self::model::{
    PatternSource, PatternSpec, RawTagDefinition, RawTagElement, RuleDefinitions, RuleSurface,
    SurfaceRuleMap, SurfaceRules, TagCondition, TagTerm,
};
pub use self::loader::RuleLoader;

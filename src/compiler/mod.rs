//! 编译模块：将规则定义编译为可执行的匹配结构
pub mod pattern;
pub mod compiler;

pub use self::pattern::{
    CompiledCondition, CompiledPattern, CompiledRuleLibrary, CompiledRuleSet, CompiledTagRule,
    CompiledTerm, Matcher,
};
pub use self::compiler::RuleCompiler;

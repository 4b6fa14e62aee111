//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum UrlTaggerError {
    // 规则配置错误（构建期）
    #[error("规则解析失败：{0}")]
    RuleParseError(String),
    #[error("标签 {tag} 引用了未定义的模式：{pattern}")]
    UnknownPattern { tag: String, pattern: String },
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),
    #[error("无效配置：{0}")]
    InvalidConfig(String),

    // 打标器相关错误
    #[error("打标器未初始化")]
    TaggerNotInitialized,

    // 网络相关错误
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),
    #[error("URL {url} 返回状态码 {status}")]
    HttpStatus { status: u16, url: String },

    // 缓存后端错误
    #[error("内容缓存失败：{0}")]
    CacheError(String),
    #[error("MessagePack序列化/反序列化失败：{0}")]
    MsgPackError(String),

    // 基础错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
}

// 全局Result类型
pub type TagResult<T> = Result<T, UrlTaggerError>;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use thiserror::Error;

pub use crate::utils::validators::ValidationError;

/// 采集错误类型
///
/// 外部采集工具失败时产生，调用方将该来源视为空语料继续处理
#[derive(Error, Debug)]
pub enum CollectionError {
    /// 无法启动外部进程
    #[error("failed to spawn `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// 外部进程以非零状态退出
    #[error("`{binary}` exited with status {code:?}")]
    NonZeroExit { binary: String, code: Option<i32> },

    /// 外部进程超时
    #[error("`{binary}` timed out after {timeout:?}")]
    Timeout { binary: String, timeout: Duration },

    /// 语料文件读写失败
    #[error("corpus I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectionError {
    /// 判断错误是否可重试
    ///
    /// 只有非零退出才值得重试，启动失败和超时重试也不会有不同结果
    pub fn is_retryable(&self) -> bool {
        matches!(self, CollectionError::NonZeroExit { .. })
    }
}

/// 补充采集错误类型
///
/// 单个URL的抓取或解析失败，只影响该URL
#[derive(Error, Debug)]
pub enum EnrichmentError {
    /// 请求失败
    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// 超时
    #[error("request timed out")]
    Timeout,

    /// URL无法解析
    #[error("invalid url `{0}`")]
    InvalidUrl(String),

    /// 其他错误
    #[error("{0}")]
    Other(String),
}

/// 序列化错误类型
///
/// 单个条目或单个产物写入失败，跳过该产物，不影响其他产物
#[derive(Error, Debug)]
pub enum SerializationError {
    /// JSON编码失败
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// XML编码失败
    #[error("xml encoding failed: {0}")]
    Xml(String),

    /// 条目包含XML不允许的字符
    #[error("token {0:?} contains characters not allowed in XML")]
    IllegalXmlChar(String),

    /// 条目包含换行，无法按行写出
    #[error("token {0:?} contains a line break")]
    MultiLineToken(String),

    /// 写文件失败
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// 流水线错误类型
///
/// 仅在目标边界使用，任何变体都会使当前目标进入 Failed 状态
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

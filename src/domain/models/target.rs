// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::validators::{validate_url, ValidationError};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// 未带协议的输入默认补全的协议前缀
pub const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// 扫描目标
///
/// 已校验的绝对URL及其工作目录键。键由网络位置（主机 + 端口）派生，
/// 路径段中不安全的字符一律替换为 `_`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// 用户输入的原始字符串
    raw: String,
    /// 解析后的URL
    url: Url,
    /// 工作目录键
    key: String,
}

impl Target {
    /// 校验并规范化目标
    ///
    /// # 参数
    ///
    /// * `raw` - 原始输入，必须已带协议
    ///
    /// # 返回值
    ///
    /// * `Ok(Target)` - 合法目标
    /// * `Err(ValidationError)` - 输入不符合URL形状
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let url = validate_url(trimmed)?;
        let host = url
            .host_str()
            .ok_or_else(|| ValidationError::MissingHost(trimmed.to_string()))?;
        let netloc = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self {
            raw: trimmed.to_string(),
            key: sanitize_key(&netloc),
            url,
        })
    }

    /// 原始输入
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 目标URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// 主机名
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// 工作目录键
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 目标在输出根目录下的工作目录
    pub fn working_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.key)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// 为缺少协议的输入补全默认协议
///
/// 已带 `http://` 或 `https://` 的输入原样返回
pub fn with_default_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, trimmed)
    }
}

/// 将网络位置转换为可作为目录名的键
fn sanitize_key(netloc: &str) -> String {
    netloc
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// 验证错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 不符合URL形状
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// 不支持的协议
    #[error("unsupported scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),
    /// 缺少主机
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// 目标URL形状：协议、域名/localhost/IPv4、可选端口、可选路径
static URL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .expect("URL shape pattern is valid")
});

/// 检查字符串是否具有URL形状
///
/// # 参数
///
/// * `raw` - 原始输入
///
/// # 返回值
///
/// 形状合法返回true
pub fn has_url_shape(raw: &str) -> bool {
    URL_SHAPE.is_match(raw)
}

/// 验证URL
///
/// # 参数
///
/// * `raw` - URL字符串
///
/// # 返回值
///
/// * `Ok(Url)` - 解析后的URL
/// * `Err(ValidationError)` - URL无效
pub fn validate_url(raw: &str) -> Result<Url, ValidationError> {
    if !has_url_shape(raw) {
        return Err(ValidationError::InvalidUrl(raw.to_string()));
    }

    let parsed = Url::parse(raw).map_err(|_| ValidationError::InvalidUrl(raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingHost(raw.to_string()));
    }

    Ok(parsed)
}

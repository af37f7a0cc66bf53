// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 判断脚本中引用的端点是否为相对路径
///
/// 绝对URL和协议相对URL（`//host/...`）都不算相对路径
pub fn is_relative_reference(reference: &str) -> bool {
    !(reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("//"))
}

/// 将相对路径解析到页面的源（协议 + 主机 + 端口）下
///
/// 与 `Url::join` 不同，不以页面路径为基准：`api/x` 与 `/api/x` 都解析为 `<origin>/api/x`
pub fn resolve_against_origin(page: &Url, reference: &str) -> Result<Url, ParseError> {
    let origin = page.origin().ascii_serialization();
    let path = if reference.starts_with('/') {
        reference.to_string()
    } else {
        format!("/{}", reference)
    };
    Url::parse(&format!("{}{}", origin, path))
}

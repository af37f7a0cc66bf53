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

use crate::config::settings::{EnrichmentSettings, RequestSettings};
use crate::engines::traits::{FetchResponse, PageFetcher};
use crate::utils::errors::EnrichmentError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use tracing::warn;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; wlmaker/0.2)";

/// 页面抓取器
///
/// 基于reqwest实现，整个运行期间共享同一个连接池
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// 按请求配置与补充采集配置构建抓取器
    ///
    /// # 参数
    ///
    /// * `request` - 自定义头、Cookie与代理
    /// * `enrichment` - 超时与TLS校验
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestFetcher)` - 抓取器
    /// * `Err(EnrichmentError)` - 代理地址非法或客户端构建失败
    pub fn new(
        request: &RequestSettings,
        enrichment: &EnrichmentSettings,
    ) -> Result<Self, EnrichmentError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(Self::default_headers(request))
            .timeout(enrichment.request_timeout());

        if let Some(proxy_url) = &request.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| EnrichmentError::Other(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        if !enrichment.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    fn default_headers(request: &RequestSettings) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (k, v) in &request.headers {
            match (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                (Ok(k), Ok(v)) => {
                    headers.insert(k, v);
                }
                _ => warn!(header = %k, "Skipping header that is not valid for HTTP"),
            }
        }

        if let Some(cookies) = &request.cookies {
            match HeaderValue::from_str(cookies) {
                Ok(v) => {
                    headers.insert(COOKIE, v);
                }
                Err(_) => warn!("Skipping cookie string that is not valid for HTTP"),
            }
        }

        headers
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `url` - 页面地址
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 抓取响应（任何状态码）
    /// * `Err(EnrichmentError)` - 连接失败或超时
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, EnrichmentError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_request_error)?;

        let status_code = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or("text/html")
            .to_string();

        let content = response.text().await.map_err(map_request_error)?;

        Ok(FetchResponse {
            status_code,
            content,
            content_type,
            final_url,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

fn map_request_error(e: reqwest::Error) -> EnrichmentError {
    if e.is_timeout() {
        EnrichmentError::Timeout
    } else {
        EnrichmentError::RequestFailed(e)
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;

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

use crate::domain::models::target::Target;
use crate::utils::errors::{CollectionError, EnrichmentError};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use url::Url;

/// 语料来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorpusSource {
    /// 爬取工具
    Crawl,
    /// 归档工具
    Archive,
}

impl CorpusSource {
    /// 语料文件名
    pub fn file_name(&self) -> &'static str {
        match self {
            CorpusSource::Crawl => "crawl_output.txt",
            CorpusSource::Archive => "archive_output.txt",
        }
    }
}

impl fmt::Display for CorpusSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusSource::Crawl => f.write_str("crawl"),
            CorpusSource::Archive => f.write_str("archive"),
        }
    }
}

/// 语料采集器特质
///
/// 外部采集工具的抽象；测试中可替换为确定性的夹具
#[async_trait]
pub trait CorpusCollector: Send + Sync {
    /// 语料来源
    fn source(&self) -> CorpusSource;

    /// 采集器名称
    fn name(&self) -> &str;

    /// 为目标采集语料并写入 `destination`
    ///
    /// 缓存判断由调用方负责，实现只需无条件执行采集
    async fn collect(&self, target: &Target, destination: &Path) -> Result<(), CollectionError>;
}

/// 抓取响应
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub content: String,
    /// 内容类型
    pub content_type: String,
    /// 跳转后的最终URL
    pub final_url: Url,
}

/// 页面抓取特质
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取页面
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, EnrichmentError>;

    /// 抓取器名称
    fn name(&self) -> &'static str;
}

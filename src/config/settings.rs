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

use crate::domain::models::output::OutputFormat;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 应用程序配置设置
///
/// 启动时构建一次，以 `Arc` 共享给所有组件
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 输出配置
    pub output: OutputSettings,
    /// 并发控制配置
    pub concurrency: ConcurrencySettings,
    /// 请求凭据配置（爬取工具与补充采集共用）
    #[serde(default)]
    pub request: RequestSettings,
    /// 爬取工具配置
    pub crawl: CrawlSettings,
    /// 归档工具配置
    pub archive: ArchiveSettings,
    /// 采集重试配置
    pub collector: CollectorSettings,
    /// 补充采集配置
    pub enrichment: EnrichmentSettings,
    /// 日志配置
    pub logging: LoggingSettings,
}

/// 输出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// 输出根目录
    pub base_dir: PathBuf,
    /// 输出格式
    pub format: OutputFormat,
}

/// 并发控制配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ConcurrencySettings {
    /// 同时处理的目标数
    pub threads: usize,
}

/// 请求凭据配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestSettings {
    /// Cookie 字符串
    pub cookies: Option<String>,
    /// 额外请求头
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// 代理URL
    pub proxy: Option<String>,
}

/// 爬取范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CrawlScope {
    Strict,
    Fuzzy,
    Subdomain,
}

impl CrawlScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlScope::Strict => "strict",
            CrawlScope::Fuzzy => "fuzzy",
            CrawlScope::Subdomain => "subdomain",
        }
    }
}

/// 爬取工具配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// 可执行文件名
    pub binary: String,
    /// 爬取深度
    pub depth: Option<u32>,
    /// 单请求超时（秒），原样传给爬取工具
    pub timeout: Option<u64>,
    /// 爬取范围
    pub scope: Option<CrawlScope>,
    /// 排除模式
    pub exclude: Option<String>,
    /// 整个进程的最长运行时间（秒）
    pub process_timeout: Option<u64>,
}

/// 归档工具配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSettings {
    /// 可执行文件名
    pub binary: String,
    /// 进程超时（秒）
    pub timeout: Option<u64>,
}

/// 采集重试配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorSettings {
    /// 非零退出时的最大重试次数
    pub max_retries: u32,
    /// 初始退避（毫秒）
    pub initial_backoff_ms: u64,
}

/// 补充采集配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentSettings {
    /// 是否启用
    pub enabled: bool,
    /// 单请求超时（秒）
    pub request_timeout: u64,
    /// 是否校验TLS证书
    pub verify_tls: bool,
    /// 每个目标最多抓取的URL数，0 表示不限
    pub max_urls: usize,
    /// 单个目标内的并发请求上限
    pub per_target_concurrency: usize,
    /// 全局并发请求上限
    pub global_concurrency: usize,
}

impl EnrichmentSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// 控制台日志过滤器
    pub filter: String,
    /// 错误日志文件
    pub error_log: PathBuf,
    /// 控制台以 JSON 格式输出
    pub json: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加：内置默认值、`config/default`、`config/<WLMAKER_ENV>`、
    /// 可选的显式配置文件、`WLMAKER__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let env = std::env::var("WLMAKER_ENV").unwrap_or_else(|_| "default".to_string());
        let mut builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix("WLMAKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 仅使用内置默认值构建配置，不读取文件和环境变量
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Output
            .set_default("output.base_dir", "output")?
            .set_default("output.format", "txt")?
            // Concurrency
            .set_default("concurrency.threads", 5)?
            // Crawl collaborator
            .set_default("crawl.binary", "katana")?
            // Archive collaborator
            .set_default("archive.binary", "waybackurls")?
            .set_default("archive.timeout", 120)?
            // Collector retries
            .set_default("collector.max_retries", 1)?
            .set_default("collector.initial_backoff_ms", 500)?
            // Enrichment
            .set_default("enrichment.enabled", true)?
            .set_default("enrichment.request_timeout", 10)?
            .set_default("enrichment.verify_tls", true)?
            .set_default("enrichment.max_urls", 500)?
            .set_default("enrichment.per_target_concurrency", 10)?
            .set_default("enrichment.global_concurrency", 50)?
            // Logging
            .set_default("logging.filter", "info")?
            .set_default("logging.error_log", "error.log")?
            .set_default("logging.json", false)
    }

    /// 工作池大小，至少为1
    pub fn worker_count(&self) -> usize {
        self.concurrency.threads.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let settings = Settings::with_defaults().unwrap();

        assert_eq!(settings.output.base_dir, PathBuf::from("output"));
        assert_eq!(settings.output.format, OutputFormat::Txt);
        assert_eq!(settings.concurrency.threads, 5);
        assert_eq!(settings.crawl.binary, "katana");
        assert_eq!(settings.crawl.depth, None);
        assert_eq!(settings.archive.binary, "waybackurls");
        assert_eq!(settings.archive.timeout, Some(120));
        assert_eq!(settings.collector.max_retries, 1);
        assert!(settings.enrichment.enabled);
        assert_eq!(settings.enrichment.request_timeout(), Duration::from_secs(10));
        assert!(settings.request.headers.is_empty());
        assert_eq!(settings.logging.error_log, PathBuf::from("error.log"));
    }

    #[test]
    fn test_explicit_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wlmaker.toml");
        std::fs::write(
            &path,
            r#"
[output]
format = "all"

[crawl]
depth = 3
scope = "subdomain"

[request.headers]
x-api-key = "secret"
"#,
        )
        .unwrap();

        let settings = Settings::new(Some(&path)).unwrap();
        assert_eq!(settings.output.format, OutputFormat::All);
        assert_eq!(settings.crawl.depth, Some(3));
        assert_eq!(settings.crawl.scope, Some(CrawlScope::Subdomain));
        assert_eq!(
            settings.request.headers.get("x-api-key").map(String::as_str),
            Some("secret")
        );
    }

    #[test]
    fn test_worker_count_is_at_least_one() {
        let mut settings = Settings::with_defaults().unwrap();
        settings.concurrency.threads = 0;
        assert_eq!(settings.worker_count(), 1);
    }
}

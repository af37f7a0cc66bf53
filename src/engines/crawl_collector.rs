// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{CrawlSettings, RequestSettings};
use crate::domain::models::target::Target;
use crate::engines::process_runner::{self, ProcessSpec};
use crate::engines::traits::{CorpusCollector, CorpusSource};
use crate::utils::errors::CollectionError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// 爬取采集器
///
/// 调用外部爬虫（默认 katana），由爬虫自己把发现的URL写入语料文件
pub struct CrawlCollector {
    crawl: CrawlSettings,
    request: RequestSettings,
}

impl CrawlCollector {
    pub fn new(crawl: CrawlSettings, request: RequestSettings) -> Self {
        Self { crawl, request }
    }

    /// 构造爬虫命令行参数
    ///
    /// 自定义头与Cookie按原样透传，只在配置了对应选项时追加参数
    pub fn build_args(&self, target: &Target, destination: &Path) -> Vec<String> {
        let mut args = vec![
            "-u".to_string(),
            target.raw().to_string(),
            "-o".to_string(),
            destination.display().to_string(),
        ];

        if let Some(cookies) = &self.request.cookies {
            args.push("-H".to_string());
            args.push(format!("Cookie: {}", cookies));
        }
        for (name, value) in &self.request.headers {
            args.push("-H".to_string());
            args.push(format!("{}: {}", name, value));
        }
        if let Some(depth) = self.crawl.depth {
            args.push("-d".to_string());
            args.push(depth.to_string());
        }
        if let Some(timeout) = self.crawl.timeout {
            args.push("-timeout".to_string());
            args.push(timeout.to_string());
        }
        if let Some(scope) = self.crawl.scope {
            args.push("-scope".to_string());
            args.push(scope.as_str().to_string());
        }
        if let Some(exclude) = &self.crawl.exclude {
            args.push("-exclude-pattern".to_string());
            args.push(exclude.clone());
        }
        if let Some(proxy) = &self.request.proxy {
            args.push("-proxy".to_string());
            args.push(proxy.clone());
        }

        args
    }
}

#[async_trait]
impl CorpusCollector for CrawlCollector {
    fn source(&self) -> CorpusSource {
        CorpusSource::Crawl
    }

    fn name(&self) -> &str {
        &self.crawl.binary
    }

    async fn collect(&self, target: &Target, destination: &Path) -> Result<(), CollectionError> {
        let spec = ProcessSpec::new(&self.crawl.binary)
            .args(self.build_args(target, destination))
            .timeout(self.crawl.process_timeout.map(Duration::from_secs));
        process_runner::run(&spec).await
    }
}

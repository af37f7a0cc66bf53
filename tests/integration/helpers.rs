// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wlmaker::config::settings::Settings;
use wlmaker::domain::models::target::Target;
use wlmaker::engines::traits::{CorpusCollector, CorpusSource, PageFetcher};
use wlmaker::utils::errors::CollectionError;
use wlmaker::workers::TargetPipeline;

/// 夹具采集器的行为
pub enum Behavior {
    /// 写出给定的语料行
    Lines(Vec<String>),
    /// 以非零状态退出
    Fail,
    /// 直接 panic
    Panic,
}

/// 确定性的进程内采集器，记录调用次数
pub struct FixtureCollector {
    source: CorpusSource,
    behavior: Behavior,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FixtureCollector {
    pub fn new(source: CorpusSource, behavior: Behavior) -> Arc<Self> {
        Self::with_delay(source, behavior, Duration::ZERO)
    }

    /// 每次采集前先等待 `delay`
    pub fn with_delay(source: CorpusSource, behavior: Behavior, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            source,
            behavior,
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn lines(source: CorpusSource, lines: &[&str]) -> Arc<Self> {
        Self::new(
            source,
            Behavior::Lines(lines.iter().map(|l| l.to_string()).collect()),
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 同时进行中的采集的最大数量
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CorpusCollector for FixtureCollector {
    fn source(&self) -> CorpusSource {
        self.source
    }

    fn name(&self) -> &str {
        "fixture"
    }

    async fn collect(&self, _target: &Target, destination: &Path) -> Result<(), CollectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.behavior {
            Behavior::Lines(lines) => {
                tokio::fs::write(destination, lines.join("\n")).await?;
                Ok(())
            }
            Behavior::Fail => Err(CollectionError::NonZeroExit {
                binary: "fixture".into(),
                code: Some(2),
            }),
            Behavior::Panic => panic!("fixture collector panicked"),
        }
    }
}

/// 输出目录指向临时目录、补充采集关闭、不重试的配置
pub fn test_settings(base_dir: &Path) -> Settings {
    let mut settings = Settings::with_defaults().unwrap();
    settings.output.base_dir = base_dir.to_path_buf();
    settings.enrichment.enabled = false;
    settings.collector.max_retries = 0;
    settings.collector.initial_backoff_ms = 1;
    settings
}

pub fn pipeline(
    settings: Settings,
    crawl: Arc<FixtureCollector>,
    archive: Arc<FixtureCollector>,
    fetcher: Option<Arc<dyn PageFetcher>>,
) -> TargetPipeline {
    TargetPipeline::new(Arc::new(settings), crawl, archive, fetcher)
}

pub fn read(dir: &Path, file: &str) -> String {
    std::fs::read_to_string(dir.join(file))
        .unwrap_or_else(|e| panic!("failed to read {}: {}", file, e))
}

pub fn target_dir(base: &Path, key: &str) -> PathBuf {
    base.join(key)
}

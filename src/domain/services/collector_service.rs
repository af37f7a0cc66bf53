// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::target::Target;
use crate::engines::traits::{CorpusCollector, CorpusSource};
use crate::utils::retry_policy::RetryPolicy;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 语料获取结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusStatus {
    /// 复用已有的非空语料，未调用采集器
    Cached,
    /// 本次采集得到
    Collected,
    /// 采集失败，按空语料处理
    Failed,
}

/// 语料句柄
#[derive(Debug, Clone)]
pub struct CorpusHandle {
    pub source: CorpusSource,
    pub path: PathBuf,
    pub status: CorpusStatus,
}

impl CorpusHandle {
    pub fn is_failed(&self) -> bool {
        self.status == CorpusStatus::Failed
    }
}

/// 语料采集服务
///
/// 负责缓存判断与重试，具体的采集交给 [`CorpusCollector`]
pub struct CollectorService {
    retry_policy: RetryPolicy,
}

impl CollectorService {
    pub fn new(retry_policy: RetryPolicy) -> Self {
        Self { retry_policy }
    }

    /// 获取目标的一份语料
    ///
    /// 工作目录中已有非空语料时直接复用，不调用采集器（缓存永不失效）。
    /// 否则调用采集器，非零退出按重试策略重试；最终失败时删除不完整的语料文件，
    /// 记录错误并返回 `Failed` 句柄，调用方将其视为空语料。
    ///
    /// # 参数
    ///
    /// * `collector` - 采集器
    /// * `target` - 目标
    /// * `working_dir` - 目标工作目录
    ///
    /// # 返回值
    ///
    /// 语料句柄
    pub async fn fetch_corpus(
        &self,
        collector: &dyn CorpusCollector,
        target: &Target,
        working_dir: &Path,
    ) -> CorpusHandle {
        let source = collector.source();
        let path = working_dir.join(source.file_name());

        if is_non_empty_file(&path).await {
            info!(
                target_url = %target,
                source = %source,
                corpus = %path.display(),
                "Reusing existing corpus"
            );
            return CorpusHandle {
                source,
                path,
                status: CorpusStatus::Cached,
            };
        }

        let mut attempt = 0;
        loop {
            match collector.collect(target, &path).await {
                Ok(()) => {
                    info!(target_url = %target, source = %source, collector = collector.name(), "Corpus collected");
                    return CorpusHandle {
                        source,
                        path,
                        status: CorpusStatus::Collected,
                    };
                }
                Err(e) if e.is_retryable() && self.retry_policy.should_retry(attempt) => {
                    attempt += 1;
                    let backoff = self.retry_policy.calculate_backoff(attempt);
                    warn!(
                        target_url = %target,
                        source = %source,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Collector failed, retrying"
                    );
                    remove_partial(&path).await;
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    error!(
                        target_url = %target,
                        source = %source,
                        collector = collector.name(),
                        error = %e,
                        "Collector failed, treating corpus as empty"
                    );
                    remove_partial(&path).await;
                    return CorpusHandle {
                        source,
                        path,
                        status: CorpusStatus::Failed,
                    };
                }
            }
        }
    }
}

async fn is_non_empty_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(corpus = %path.display(), error = %e, "Failed to remove partial corpus");
        }
    }
}

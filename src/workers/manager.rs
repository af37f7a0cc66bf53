// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::report::{TargetPhase, TargetReport};
use crate::domain::models::target::Target;
use crate::workers::pipeline::TargetPipeline;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
///
/// 固定大小的工作池：每个目标一个任务，由信号量限制同时运行的目标数。
/// 目录键相同的输入共用一把锁，同一时刻只有一个任务拥有该工作目录。
pub struct WorkerManager {
    pipeline: Arc<TargetPipeline>,
    workers: usize,
    progress: Option<ProgressBar>,
}

impl WorkerManager {
    pub fn new(pipeline: Arc<TargetPipeline>, workers: usize) -> Self {
        Self {
            pipeline,
            workers: workers.max(1),
            progress: None,
        }
    }

    /// 在终端显示进度条
    pub fn with_progress(mut self, total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
        {
            bar.set_style(style);
        }
        self.progress = Some(bar);
        self
    }

    /// 处理全部目标
    ///
    /// 单个目标失败（包括任务 panic）只体现在它自己的报告中，其余目标照常完成。
    ///
    /// # 参数
    ///
    /// * `inputs` - 目标输入
    ///
    /// # 返回值
    ///
    /// 与输入顺序一致的报告列表
    pub async fn run(&self, inputs: Vec<String>) -> Vec<TargetReport> {
        info!(targets = inputs.len(), workers = self.workers, "Starting worker pool");
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut key_locks: HashMap<String, Arc<Mutex<()>>> = HashMap::new();

        let handles: Vec<(String, JoinHandle<TargetReport>)> = inputs
            .into_iter()
            .map(|input| {
                let pipeline = self.pipeline.clone();
                let semaphore = semaphore.clone();
                let progress = self.progress.clone();
                let task_input = input.clone();
                let key_lock = Target::parse(&input)
                    .ok()
                    .map(|target| key_locks.entry(target.key().to_string()).or_default().clone());

                let handle = tokio::spawn(async move {
                    // Key lock first, then the worker permit
                    let _key_guard = match key_lock {
                        Some(lock) => Some(lock.lock_owned().await),
                        None => None,
                    };
                    let _permit = semaphore.acquire_owned().await;
                    let report = pipeline.run(&task_input).await;
                    if let Some(bar) = progress {
                        bar.set_message(task_input);
                        bar.inc(1);
                    }
                    report
                });
                (input, handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (input, handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(target_url = %input, error = %e, "Worker task aborted");
                    if let Some(bar) = &self.progress {
                        bar.inc(1);
                    }
                    reports.push(TargetReport::failed(
                        &input,
                        None,
                        TargetPhase::Queued,
                        format!("worker task aborted: {}", e),
                    ));
                }
            }
        }

        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }

        let done = reports.iter().filter(|r| r.is_done()).count();
        info!(done, failed = reports.len() - done, "Worker pool finished");
        reports
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::models::category::CategorySets;
use crate::domain::models::report::{TargetPhase, TargetReport, TargetStatus};
use crate::domain::models::target::Target;
use crate::domain::services::aggregation_service::AggregationService;
use crate::domain::services::classification_service::ClassificationService;
use crate::domain::services::collector_service::CollectorService;
use crate::domain::services::enrichment_service::EnrichmentService;
use crate::engines::archive_collector::ArchiveCollector;
use crate::engines::crawl_collector::CrawlCollector;
use crate::engines::reqwest_engine::ReqwestFetcher;
use crate::engines::traits::{CorpusCollector, PageFetcher};
use crate::infrastructure::output_writer::OutputWriter;
use crate::utils::errors::{EnrichmentError, PipelineError};
use crate::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 单目标流水线
///
/// 阶段严格顺序执行：校验 → 采集 → 分类 → 补充采集 → 聚合 → 写出。
/// 任何阶段的错误都在目标边界被捕获，记录目标与阶段后使该目标失败，不影响其他目标。
pub struct TargetPipeline {
    settings: Arc<Settings>,
    crawl: Arc<dyn CorpusCollector>,
    archive: Arc<dyn CorpusCollector>,
    collector_service: CollectorService,
    classification: ClassificationService,
    enrichment: Option<EnrichmentService>,
    writer: OutputWriter,
}

impl TargetPipeline {
    /// 使用给定的采集器与抓取器构建流水线
    ///
    /// `fetcher` 为 None 或配置关闭补充采集时跳过补充采集阶段
    pub fn new(
        settings: Arc<Settings>,
        crawl: Arc<dyn CorpusCollector>,
        archive: Arc<dyn CorpusCollector>,
        fetcher: Option<Arc<dyn PageFetcher>>,
    ) -> Self {
        let enrichment = fetcher
            .filter(|_| settings.enrichment.enabled)
            .map(|fetcher| {
                EnrichmentService::new(
                    fetcher,
                    EnrichmentService::global_semaphore(&settings.enrichment),
                    &settings.enrichment,
                )
            });

        Self {
            collector_service: CollectorService::new(RetryPolicy::from_settings(
                &settings.collector,
            )),
            classification: ClassificationService::default(),
            writer: OutputWriter::new(settings.output.format),
            enrichment,
            crawl,
            archive,
            settings,
        }
    }

    /// 按配置构建使用外部工具与 reqwest 的流水线
    pub fn from_settings(settings: Arc<Settings>) -> Result<Self, EnrichmentError> {
        let crawl = Arc::new(CrawlCollector::new(
            settings.crawl.clone(),
            settings.request.clone(),
        ));
        let archive = Arc::new(ArchiveCollector::new(settings.archive.clone()));
        let fetcher: Option<Arc<dyn PageFetcher>> = if settings.enrichment.enabled {
            Some(Arc::new(ReqwestFetcher::new(
                &settings.request,
                &settings.enrichment,
            )?))
        } else {
            None
        };

        Ok(Self::new(settings, crawl, archive, fetcher))
    }

    /// 处理一个目标输入
    ///
    /// # 参数
    ///
    /// * `input` - 目标输入（已补全协议）
    ///
    /// # 返回值
    ///
    /// 目标报告，失败时包含失败阶段与原因
    pub async fn run(&self, input: &str) -> TargetReport {
        let mut phase = TargetPhase::Queued;
        let mut key = None;

        match self.process(input, &mut phase, &mut key).await {
            Ok(report) => report,
            Err(e) => {
                error!(target_url = input, phase = %phase, error = %e, "Target failed");
                TargetReport::failed(input, key, phase, e.to_string())
            }
        }
    }

    async fn process(
        &self,
        input: &str,
        phase: &mut TargetPhase,
        key: &mut Option<String>,
    ) -> Result<TargetReport, PipelineError> {
        *phase = TargetPhase::Validating;
        let target = Target::parse(input)?;
        *key = Some(target.key().to_string());

        let dir = target.working_dir(&self.settings.output.base_dir);
        tokio::fs::create_dir_all(&dir).await?;
        info!(target_url = %target, dir = %dir.display(), "Processing target");

        *phase = TargetPhase::Collecting;
        let (crawl_corpus, archive_corpus) = tokio::join!(
            self.collector_service
                .fetch_corpus(self.crawl.as_ref(), &target, &dir),
            self.collector_service
                .fetch_corpus(self.archive.as_ref(), &target, &dir),
        );

        if crawl_corpus.is_failed() && archive_corpus.is_failed() {
            warn!(target_url = %target, "Both sources failed, wordlists will be empty");
        }

        *phase = TargetPhase::Classifying;
        let crawl_sets = self.classification.classify_corpus(&crawl_corpus.path).await?;
        let archive_sets = self
            .classification
            .classify_corpus(&archive_corpus.path)
            .await?;
        let corpus_union = AggregationService::merge([&crawl_sets, &archive_sets]);
        let early = self
            .writer
            .write_classification_lists(corpus_union.sets(), &dir)
            .await;

        *phase = TargetPhase::Enriching;
        let enrichment_sets = match &self.enrichment {
            Some(enrichment) => {
                let candidates = enrichment.candidates_from_corpus(&crawl_corpus.path).await?;
                enrichment.enrich(&target, candidates).await
            }
            None => CategorySets::new(),
        };

        *phase = TargetPhase::Aggregating;
        let result = AggregationService::merge([&crawl_sets, &archive_sets, &enrichment_sets]);

        *phase = TargetPhase::Writing;
        let mut written = early.written.len();
        let mut failed = early.failed;

        let report = self.writer.write(&result, &dir).await;
        written += report.written.len();
        failed += report.failed;

        match self.writer.write_summary(&target, &result, &dir).await {
            Ok(_) => written += 1,
            Err(e) => {
                failed += 1;
                error!(target_url = %target, phase = %phase, error = %e, "Failed to write summary");
            }
        }

        info!(
            target_url = %target,
            artifacts_written = written,
            artifacts_failed = failed,
            "Target done"
        );

        Ok(TargetReport {
            input: input.to_string(),
            key: key.clone(),
            status: TargetStatus::Done,
            counts: result.counts(),
            artifacts_written: written,
            artifacts_failed: failed,
        })
    }
}

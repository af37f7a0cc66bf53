// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::EnrichmentSettings;
use crate::domain::models::category::{Category, CategorySets};
use crate::domain::models::target::Target;
use crate::engines::traits::PageFetcher;
use crate::utils::errors::EnrichmentError;
use crate::utils::url_utils::{is_relative_reference, resolve_against_origin};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Semaphore;
use tracing::{debug, error, info};
use url::Url;

static SCRIPT_ENDPOINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:fetch|axios\.post|ajax|\.post)\s*\(\s*['"]([^'"]+)['"]"#)
        .expect("script endpoint pattern is valid")
});

static FORM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("form").expect("form selector is valid"));
static FORM_CONTROL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("input[name], textarea[name], select[name]")
        .expect("form control selector is valid")
});
static SCRIPT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("script selector is valid"));

/// 补充采集服务
///
/// 对爬取语料中的URL发起实时请求，从页面中恢复POST参数名与脚本端点。
/// 并发受两级限制：每个目标内部的 `buffer_unordered`，以及所有目标共享的信号量。
pub struct EnrichmentService {
    fetcher: Arc<dyn PageFetcher>,
    global_limit: Arc<Semaphore>,
    per_target_concurrency: usize,
    max_urls: usize,
}

impl EnrichmentService {
    /// 按配置创建服务，全局信号量由调用方共享
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        global_limit: Arc<Semaphore>,
        settings: &EnrichmentSettings,
    ) -> Self {
        Self {
            fetcher,
            global_limit,
            per_target_concurrency: settings.per_target_concurrency.max(1),
            max_urls: settings.max_urls,
        }
    }

    /// 为全局并发上限创建信号量
    pub fn global_semaphore(settings: &EnrichmentSettings) -> Arc<Semaphore> {
        Arc::new(Semaphore::new(settings.global_concurrency.max(1)))
    }

    /// 从语料行中挑选候选URL
    ///
    /// 跳过空行与 `#` 开头的行，去重并保持首次出现的顺序，`max_urls` 为0时不限数量
    pub fn select_candidates<'a, I>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if seen.insert(line) {
                candidates.push(line.to_string());
                if self.max_urls > 0 && candidates.len() >= self.max_urls {
                    break;
                }
            }
        }
        candidates
    }

    /// 读取语料文件并挑选候选URL，文件不存在时返回空列表
    pub async fn candidates_from_corpus(&self, corpus: &Path) -> std::io::Result<Vec<String>> {
        let file = match tokio::fs::File::open(corpus).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut lines = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            lines.push(String::from_utf8_lossy(&buf).into_owned());
        }

        Ok(self.select_candidates(lines.iter().map(String::as_str)))
    }

    /// 对一组URL执行补充采集
    ///
    /// 单个URL失败只记录错误，不影响其余URL
    ///
    /// # 参数
    ///
    /// * `target` - 所属目标，仅用于日志
    /// * `urls` - 候选URL
    ///
    /// # 返回值
    ///
    /// 只包含 PostParameterName 与 DiscoveredEndpointURL 两类的分类结果
    pub async fn enrich(&self, target: &Target, urls: Vec<String>) -> CategorySets {
        let total = urls.len();
        let results: Vec<(String, Result<CategorySets, EnrichmentError>)> = stream::iter(urls)
            .map(|url| async move {
                let result = self.enrich_one(&url).await;
                (url, result)
            })
            .buffer_unordered(self.per_target_concurrency)
            .collect()
            .await;

        let mut merged = CategorySets::new();
        let mut failed = 0usize;
        for (url, result) in results {
            match result {
                Ok(sets) => merged.extend(&sets),
                Err(e) => {
                    failed += 1;
                    error!(target_url = %target, phase = "enriching", url = %url, error = %e, "Enrichment fetch failed");
                }
            }
        }

        info!(
            target_url = %target,
            urls = total,
            failed,
            post_params = merged.count(Category::PostParameterName),
            endpoints = merged.count(Category::DiscoveredEndpointUrl),
            "Enrichment finished"
        );
        merged
    }

    async fn enrich_one(&self, raw: &str) -> Result<CategorySets, EnrichmentError> {
        let url = Url::parse(raw).map_err(|_| EnrichmentError::InvalidUrl(raw.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EnrichmentError::InvalidUrl(raw.to_string()));
        }

        let _permit = self
            .global_limit
            .acquire()
            .await
            .map_err(|e| EnrichmentError::Other(e.to_string()))?;

        let response = self.fetcher.fetch(&url).await?;
        debug!(
            url = %url,
            status = response.status_code,
            content_type = %response.content_type,
            fetcher = self.fetcher.name(),
            "Fetched page"
        );

        Ok(extract_from_markup(&response.final_url, &response.content))
    }
}

/// 从页面标记中提取POST参数名与脚本端点
///
/// 方法为POST（不区分大小写）的表单中，带 `name` 属性的 `input`/`textarea`/`select`
/// 计入 PostParameterName；内联脚本中以字符串字面量调用 fetch/ajax/post 的相对路径
/// 解析到页面源下后计入 DiscoveredEndpointURL，绝对URL与协议相对URL被跳过。
///
/// # 参数
///
/// * `page_url` - 页面地址
/// * `markup` - 页面内容
///
/// # 返回值
///
/// 分类结果
pub fn extract_from_markup(page_url: &Url, markup: &str) -> CategorySets {
    let document = Html::parse_document(markup);
    let mut sets = CategorySets::new();

    for form in document.select(&FORM) {
        let is_post = form
            .value()
            .attr("method")
            .is_some_and(|m| m.trim().eq_ignore_ascii_case("post"));
        if !is_post {
            continue;
        }
        for control in form.select(&FORM_CONTROL) {
            if let Some(name) = control.value().attr("name") {
                sets.insert(Category::PostParameterName, name);
            }
        }
    }

    for script in document.select(&SCRIPT) {
        let body: String = script.text().collect();
        for cap in SCRIPT_ENDPOINT.captures_iter(&body) {
            let reference = cap[1].trim();
            if reference.is_empty() || !is_relative_reference(reference) {
                continue;
            }
            match resolve_against_origin(page_url, reference) {
                Ok(resolved) => {
                    sets.insert(Category::DiscoveredEndpointUrl, resolved.as_str());
                }
                Err(e) => debug!(reference, error = %e, "Unresolvable script endpoint"),
            }
        }
    }

    sets
}

#[cfg(test)]
#[path = "enrichment_service_test.rs"]
mod tests;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::category::{Category, CategorySets};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use url::Url;

static QUERY_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]([a-zA-Z0-9_\-.]+)=").expect("query key pattern is valid"));

static PATH_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_\-.]+$").expect("path segment pattern is valid"));

static NETLOC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://([^/?#\s]+)").expect("netloc pattern is valid"));

static URL_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^/?#\s]+(/[^?#]*)").expect("url path pattern is valid"));

static STATIC_ASSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\.(?:js|css|pdf|jpg|jpeg|png|gif|svg|xml|json|csv|doc|docx|xls|xlsx|ppt|pptx|zip|tar|gz|rar|exe|dll|so|txt)(?:\?|#|$)",
    )
    .expect("static asset pattern is valid")
});

static FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([a-zA-Z0-9_\-.]+)").expect("fragment pattern is valid"));

static VERSION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v\d+$").expect("version marker pattern is valid"));

/// API 标记段（版本标记 `v<数字>` 单独匹配）
const API_MARKERS: [&str; 5] = ["api", "graphql", "rest", "data", "service"];

/// 分类时的单行上下文
///
/// 原始行只做首尾空白裁剪；结构化解析结果在构造时计算一次，供所有规则共享
pub struct LineContext<'a> {
    raw: &'a str,
    parsed: Option<Url>,
}

impl<'a> LineContext<'a> {
    pub fn new(raw: &'a str) -> Self {
        let raw = raw.trim();
        Self {
            raw,
            parsed: Url::parse(raw).ok(),
        }
    }

    /// 原始行
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// 结构化解析结果，解析失败为 None
    pub fn parsed(&self) -> Option<&Url> {
        self.parsed.as_ref()
    }

    /// 主机之后、`?`/`#` 之前的路径（含前导斜杠）
    pub fn path(&self) -> Option<&'a str> {
        URL_PATH
            .captures(self.raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// 分类规则
///
/// 每条规则由谓词、提取器和目标类别组成。规则之间互不排斥，一行可以命中多条规则。
pub trait ClassificationRule: Send + Sync {
    /// 规则名称
    fn name(&self) -> &'static str;

    /// 提取结果归入的类别
    fn category(&self) -> Category;

    /// 谓词：该行是否需要执行提取
    fn applies(&self, _line: &LineContext<'_>) -> bool {
        true
    }

    /// 提取器：返回原始词条，空白词条由集合统一丢弃
    fn extract(&self, line: &LineContext<'_>) -> Vec<String>;
}

/// 查询参数名：结构化解析 + 词法匹配，两者取并集
pub struct QueryParameterRule;

impl ClassificationRule for QueryParameterRule {
    fn name(&self) -> &'static str {
        "query_parameter"
    }

    fn category(&self) -> Category {
        Category::QueryParameter
    }

    fn applies(&self, line: &LineContext<'_>) -> bool {
        line.raw().contains('?') || line.raw().contains('&')
    }

    fn extract(&self, line: &LineContext<'_>) -> Vec<String> {
        let mut keys: Vec<String> = line
            .parsed()
            .filter(|url| url.query().is_some())
            .map(|url| {
                url.query_pairs()
                    .map(|(key, _)| key.into_owned())
                    .filter(|key| !key.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        // Malformed URLs rejected by the parser still expose `?key=` / `&key=`
        keys.extend(
            QUERY_KEY
                .captures_iter(line.raw())
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
        );
        keys
    }
}

/// 路径段：两侧都有斜杠的段
pub struct PathSegmentRule;

impl ClassificationRule for PathSegmentRule {
    fn name(&self) -> &'static str {
        "path_segment"
    }

    fn category(&self) -> Category {
        Category::PathSegment
    }

    fn applies(&self, line: &LineContext<'_>) -> bool {
        line.raw().contains('/')
    }

    fn extract(&self, line: &LineContext<'_>) -> Vec<String> {
        let parts: Vec<&str> = line.raw().split('/').collect();
        if parts.len() < 3 {
            return Vec::new();
        }
        // First and last pieces lack a slash on one side
        parts[1..parts.len() - 1]
            .iter()
            .filter(|segment| PATH_SEGMENT.is_match(segment))
            .map(|segment| segment.to_string())
            .collect()
    }
}

/// 子域名：每行第一个 `http(s)://` 之后的网络位置
pub struct SubdomainRule;

impl ClassificationRule for SubdomainRule {
    fn name(&self) -> &'static str {
        "subdomain"
    }

    fn category(&self) -> Category {
        Category::Subdomain
    }

    fn extract(&self, line: &LineContext<'_>) -> Vec<String> {
        NETLOC
            .captures(line.raw())
            .and_then(|caps| caps.get(1))
            .map(|m| vec![m.as_str().to_string()])
            .unwrap_or_default()
    }
}

/// 目录路径：主机之后到 `?`/`#` 之前，去掉前导斜杠
pub struct DirectoryPathRule;

impl ClassificationRule for DirectoryPathRule {
    fn name(&self) -> &'static str {
        "directory_path"
    }

    fn category(&self) -> Category {
        Category::DirectoryPath
    }

    fn extract(&self, line: &LineContext<'_>) -> Vec<String> {
        line.path()
            .map(|path| path.trim())
            .map(|path| path.strip_prefix('/').unwrap_or(path))
            .map(|path| vec![path.to_string()])
            .unwrap_or_default()
    }
}

/// 静态资源：扩展名后紧跟 `?`、`#` 或行尾时整行记录
pub struct StaticAssetRule;

impl ClassificationRule for StaticAssetRule {
    fn name(&self) -> &'static str {
        "static_asset"
    }

    fn category(&self) -> Category {
        Category::StaticAssetLine
    }

    fn applies(&self, line: &LineContext<'_>) -> bool {
        STATIC_ASSET.is_match(line.raw())
    }

    fn extract(&self, line: &LineContext<'_>) -> Vec<String> {
        vec![line.raw().to_string()]
    }
}

/// 片段：`#` 之后的第一个合法标识
pub struct FragmentRule;

impl ClassificationRule for FragmentRule {
    fn name(&self) -> &'static str {
        "fragment"
    }

    fn category(&self) -> Category {
        Category::Fragment
    }

    fn applies(&self, line: &LineContext<'_>) -> bool {
        line.raw().contains('#')
    }

    fn extract(&self, line: &LineContext<'_>) -> Vec<String> {
        FRAGMENT
            .captures(line.raw())
            .and_then(|caps| caps.get(1))
            .map(|m| vec![m.as_str().to_string()])
            .unwrap_or_default()
    }
}

/// API 端点：路径中最后一个带非空剩余部分的标记段之后的路径
pub struct ApiEndpointRule;

impl ApiEndpointRule {
    fn is_marker(segment: &str) -> bool {
        API_MARKERS.contains(&segment) || VERSION_MARKER.is_match(segment)
    }
}

impl ClassificationRule for ApiEndpointRule {
    fn name(&self) -> &'static str {
        "api_endpoint"
    }

    fn category(&self) -> Category {
        Category::ApiEndpointPath
    }

    fn extract(&self, line: &LineContext<'_>) -> Vec<String> {
        let Some(path) = line.path() else {
            return Vec::new();
        };
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        segments
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, segment)| Self::is_marker(segment))
            .map(|(index, _)| segments[index + 1..].join("/"))
            .map(|rest| rest.trim().trim_end_matches('/').to_string())
            .find(|rest| !rest.is_empty())
            .map(|rest| vec![rest])
            .unwrap_or_default()
    }
}

/// 有序规则链
///
/// 规则按加入顺序执行；每条规则独立求值，先后顺序只决定日志和调试输出的顺序
pub struct RuleChain {
    rules: Vec<Box<dyn ClassificationRule>>,
}

impl Default for RuleChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleChain {
    /// 空规则链
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// 标准规则链：查询参数、路径段、子域名、目录路径、静态资源、片段、API 端点
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(QueryParameterRule)
            .with_rule(PathSegmentRule)
            .with_rule(SubdomainRule)
            .with_rule(DirectoryPathRule)
            .with_rule(StaticAssetRule)
            .with_rule(FragmentRule)
            .with_rule(ApiEndpointRule)
    }

    /// 在链尾追加规则
    pub fn with_rule<R: ClassificationRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// 规则名称，按执行顺序
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// 对单行执行全部规则
    pub fn classify_line(&self, raw: &str, sets: &mut CategorySets) {
        let line = LineContext::new(raw);
        if line.raw().is_empty() {
            return;
        }

        for rule in &self.rules {
            if !rule.applies(&line) {
                continue;
            }
            for token in rule.extract(&line) {
                sets.insert(rule.category(), &token);
            }
        }
    }
}

/// 分类服务
///
/// 逐行读取语料并交给规则链分类
#[derive(Default)]
pub struct ClassificationService {
    chain: RuleChain,
}

impl ClassificationService {
    pub fn new(chain: RuleChain) -> Self {
        Self { chain }
    }

    /// 对内存中的若干行分类
    pub fn classify_lines<'a, I>(&self, lines: I) -> CategorySets
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sets = CategorySets::new();
        for line in lines {
            self.chain.classify_line(line, &mut sets);
        }
        sets
    }

    /// 流式分类语料文件
    ///
    /// 非法字节被替换为 U+FFFD，不会因单行内容中断；文件不存在时视为空语料
    ///
    /// # 参数
    ///
    /// * `corpus` - 语料文件路径
    ///
    /// # 返回值
    ///
    /// * `Ok(CategorySets)` - 分类结果
    /// * `Err(std::io::Error)` - 读取失败
    pub async fn classify_corpus(&self, corpus: &Path) -> std::io::Result<CategorySets> {
        let file = match File::open(corpus).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(corpus = %corpus.display(), "Corpus missing, treating as empty");
                return Ok(CategorySets::new());
            }
            Err(e) => return Err(e),
        };

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut sets = CategorySets::new();
        let mut lines = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            self.chain.classify_line(&line, &mut sets);
            lines += 1;
        }

        debug!(corpus = %corpus.display(), lines, "Corpus classified");
        Ok(sets)
    }
}

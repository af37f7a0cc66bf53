// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 分类类别
///
/// 一行URL可以落入零个或多个类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// 查询参数名
    QueryParameter,
    /// 两侧均有斜杠的路径段
    PathSegment,
    /// 网络位置（子域名）
    Subdomain,
    /// 主机之后、`?`/`#` 之前的完整路径
    DirectoryPath,
    /// 静态资源所在的整行
    StaticAssetLine,
    /// 片段标识
    Fragment,
    /// API 标记段之后的路径
    ApiEndpointPath,
    /// POST 表单字段名
    PostParameterName,
    /// 脚本中引用的端点URL
    DiscoveredEndpointUrl,
}

impl Category {
    /// 全部类别，按摘要输出顺序排列
    pub const ALL: [Category; 9] = [
        Category::QueryParameter,
        Category::PathSegment,
        Category::Subdomain,
        Category::DirectoryPath,
        Category::ApiEndpointPath,
        Category::PostParameterName,
        Category::DiscoveredEndpointUrl,
        Category::StaticAssetLine,
        Category::Fragment,
    ];

    /// 输出文件名（不含扩展名）
    pub fn file_stem(&self) -> &'static str {
        match self {
            Category::QueryParameter => "params_wordlist",
            Category::PathSegment => "directories_wordlist",
            Category::Subdomain => "subdomains_wordlist",
            Category::DirectoryPath => "extracted_directories_wordlist",
            Category::StaticAssetLine => "static_files",
            Category::Fragment => "fragments",
            Category::ApiEndpointPath => "api_endpoints",
            Category::PostParameterName => "post_params_wordlist",
            Category::DiscoveredEndpointUrl => "discovered_endpoints",
        }
    }

    /// XML 根元素名
    pub fn xml_root(&self) -> &'static str {
        match self {
            Category::QueryParameter => "params",
            Category::PathSegment => "directories",
            Category::Subdomain => "subdomains",
            Category::DirectoryPath => "extracted_dirs",
            Category::StaticAssetLine => "static_files",
            Category::Fragment => "fragments",
            Category::ApiEndpointPath => "api_endpoints",
            Category::PostParameterName => "post_params",
            Category::DiscoveredEndpointUrl => "discovered_endpoints",
        }
    }

    /// 摘要中的标签
    pub fn summary_label(&self) -> &'static str {
        match self {
            Category::QueryParameter => "Parameters found",
            Category::PathSegment => "Directories found",
            Category::Subdomain => "Subdomains found",
            Category::DirectoryPath => "Extracted directory paths",
            Category::StaticAssetLine => "Static files found",
            Category::Fragment => "Fragments found",
            Category::ApiEndpointPath => "API endpoints found",
            Category::PostParameterName => "POST parameters found",
            Category::DiscoveredEndpointUrl => "Script endpoints found",
        }
    }

    /// 诊断类别只在分类阶段以纯文本落盘，不参与多格式输出
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Category::StaticAssetLine | Category::Fragment)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xml_root())
    }
}

static EMPTY: BTreeSet<String> = BTreeSet::new();

/// 按类别分组的去重词条集合
///
/// 集合为有序集合，输出顺序总是字典序。空白词条在插入前即被丢弃。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySets {
    sets: BTreeMap<Category, BTreeSet<String>>,
}

impl CategorySets {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一个词条
    ///
    /// 词条先去除首尾空白，空串直接丢弃
    ///
    /// # 返回值
    ///
    /// 新插入返回true，已存在或被丢弃返回false
    pub fn insert(&mut self, category: Category, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }
        self.sets
            .entry(category)
            .or_default()
            .insert(token.to_string())
    }

    /// 某个类别的全部词条
    pub fn get(&self, category: Category) -> &BTreeSet<String> {
        self.sets.get(&category).unwrap_or(&EMPTY)
    }

    /// 某个类别的词条数
    pub fn count(&self, category: Category) -> usize {
        self.get(category).len()
    }

    /// 是否所有类别都为空
    pub fn is_empty(&self) -> bool {
        self.sets.values().all(BTreeSet::is_empty)
    }

    /// 将另一组集合逐类别并入自身
    pub fn extend(&mut self, other: &CategorySets) {
        for (category, tokens) in &other.sets {
            if tokens.is_empty() {
                continue;
            }
            self.sets
                .entry(*category)
                .or_default()
                .extend(tokens.iter().cloned());
        }
    }
}

/// 单个目标的最终结果
///
/// 由聚合阶段一次性生成，之后只读，交给写出阶段使用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetResult {
    sets: CategorySets,
}

impl TargetResult {
    pub fn new(sets: CategorySets) -> Self {
        Self { sets }
    }

    /// 某个类别的有序词条
    pub fn tokens(&self, category: Category) -> &BTreeSet<String> {
        self.sets.get(category)
    }

    /// 每个类别的词条数
    pub fn counts(&self) -> BTreeMap<Category, usize> {
        Category::ALL
            .iter()
            .map(|category| (*category, self.sets.count(*category)))
            .collect()
    }

    pub fn sets(&self) -> &CategorySets {
        &self.sets
    }
}

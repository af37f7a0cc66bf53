// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::category::Category;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 用户选择的输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
    Xml,
    All,
}

impl OutputFormat {
    /// 该格式对应的编码列表
    pub fn encodings(&self) -> Vec<Encoding> {
        match self {
            OutputFormat::Txt => vec![Encoding::PlainList],
            OutputFormat::Json => vec![Encoding::StructuredRecord],
            OutputFormat::Xml => vec![Encoding::TreeMarkup],
            OutputFormat::All => vec![
                Encoding::PlainList,
                Encoding::StructuredRecord,
                Encoding::TreeMarkup,
            ],
        }
    }
}

/// 产物编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// 每行一个词条
    PlainList,
    /// JSON 数组
    StructuredRecord,
    /// XML 树
    TreeMarkup,
}

impl Encoding {
    pub fn extension(&self) -> &'static str {
        match self {
            Encoding::PlainList => "txt",
            Encoding::StructuredRecord => "json",
            Encoding::TreeMarkup => "xml",
        }
    }
}

/// 输出产物
///
/// (类别, 编码) 对解析到目标工作目录下的具体文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub category: Category,
    pub encoding: Encoding,
    pub path: PathBuf,
}

impl OutputArtifact {
    pub fn resolve(dir: &Path, category: Category, encoding: Encoding) -> Self {
        let path = dir.join(format!("{}.{}", category.file_stem(), encoding.extension()));
        Self {
            category,
            encoding,
            path,
        }
    }
}

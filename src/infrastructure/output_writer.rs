// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::category::{Category, CategorySets, TargetResult};
use crate::domain::models::output::{Encoding, OutputArtifact, OutputFormat};
use crate::domain::models::target::Target;
use crate::utils::errors::SerializationError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};

/// 写出统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// 成功写出的文件
    pub written: Vec<PathBuf>,
    /// 失败的产物数
    pub failed: usize,
}

impl WriteReport {
    fn absorb(&mut self, other: WriteReport) {
        self.written.extend(other.written);
        self.failed += other.failed;
    }
}

/// 输出写入器
///
/// 每个产物独立写出：某个编码或某个文件失败只记录并跳过该产物
pub struct OutputWriter {
    encodings: Vec<Encoding>,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            encodings: format.encodings(),
        }
    }

    /// 按请求的编码写出所有非诊断类别
    ///
    /// # 参数
    ///
    /// * `result` - 目标结果
    /// * `dir` - 目标工作目录
    ///
    /// # 返回值
    ///
    /// 写出统计
    pub async fn write(&self, result: &TargetResult, dir: &Path) -> WriteReport {
        let mut report = WriteReport::default();
        for category in Category::ALL.into_iter().filter(|c| !c.is_diagnostic()) {
            for encoding in &self.encodings {
                let artifact = OutputArtifact::resolve(dir, category, *encoding);
                report.absorb(write_artifact(&artifact, result.tokens(category)).await);
            }
        }
        report
    }

    /// 写出分类阶段的纯文本产物
    ///
    /// 诊断类别（静态资源、片段）以及 API 端点在分类结束后立即以 `.txt` 落盘
    pub async fn write_classification_lists(&self, sets: &CategorySets, dir: &Path) -> WriteReport {
        let mut report = WriteReport::default();
        for category in [
            Category::StaticAssetLine,
            Category::Fragment,
            Category::ApiEndpointPath,
        ] {
            let artifact = OutputArtifact::resolve(dir, category, Encoding::PlainList);
            report.absorb(write_artifact(&artifact, sets.get(category)).await);
        }
        report
    }

    /// 写出 summary.txt
    pub async fn write_summary(
        &self,
        target: &Target,
        result: &TargetResult,
        dir: &Path,
    ) -> Result<PathBuf, SerializationError> {
        let path = dir.join("summary.txt");
        fs::write(&path, render_summary(target, result)).await?;
        Ok(path)
    }
}

async fn write_artifact(artifact: &OutputArtifact, tokens: &BTreeSet<String>) -> WriteReport {
    let encoded = match artifact.encoding {
        Encoding::PlainList => Ok(encode_plain_list(tokens)),
        Encoding::StructuredRecord => encode_structured_record(tokens),
        Encoding::TreeMarkup => Ok(encode_tree_markup(artifact.category.xml_root(), tokens)),
    };

    let result = match encoded {
        Ok(body) => fs::write(&artifact.path, body)
            .await
            .map_err(SerializationError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            debug!(artifact = %artifact.path.display(), tokens = tokens.len(), "Artifact written");
            WriteReport {
                written: vec![artifact.path.clone()],
                failed: 0,
            }
        }
        Err(e) => {
            error!(
                phase = "writing",
                artifact = %artifact.path.display(),
                error = %e,
                "Failed to write artifact, skipping"
            );
            WriteReport {
                written: Vec::new(),
                failed: 1,
            }
        }
    }
}

/// 每行一个词条，末尾无空行
///
/// 含换行的词条无法按行读回，被跳过并记录
pub fn encode_plain_list(tokens: &BTreeSet<String>) -> String {
    tokens
        .iter()
        .filter_map(|token| match check_single_line(token) {
            Ok(()) => Some(token.as_str()),
            Err(e) => {
                error!(error = %e, "Skipping token in plain-list output");
                None
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_single_line(token: &str) -> Result<(), SerializationError> {
    if token.contains(['\n', '\r']) {
        Err(SerializationError::MultiLineToken(token.to_string()))
    } else {
        Ok(())
    }
}

/// 有序 JSON 数组，4 空格缩进
pub fn encode_structured_record(tokens: &BTreeSet<String>) -> Result<String, SerializationError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tokens.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// XML 树：根元素下每个词条一个 `<item>`
///
/// 含 XML 1.0 非法字符的词条被跳过并记录；缩进序列化失败时退回单行序列化
pub fn encode_tree_markup(root: &str, tokens: &BTreeSet<String>) -> String {
    let items: Vec<&str> = tokens
        .iter()
        .filter_map(|token| match check_xml_chars(token) {
            Ok(()) => Some(token.as_str()),
            Err(e) => {
                error!(root, error = %e, "Skipping token in XML output");
                None
            }
        })
        .collect();

    match write_indented_xml(root, &items) {
        Ok(xml) => xml,
        Err(e) => {
            warn!(root, error = %e, "Indented XML serialization failed, writing single-line form");
            write_single_line_xml(root, &items)
        }
    }
}

fn check_xml_chars(token: &str) -> Result<(), SerializationError> {
    let legal = |c: char| {
        matches!(c, '\u{9}' | '\u{A}' | '\u{D}')
            || ('\u{20}'..='\u{D7FF}').contains(&c)
            || ('\u{E000}'..='\u{FFFD}').contains(&c)
            || c >= '\u{10000}'
    };
    if token.chars().all(legal) {
        Ok(())
    } else {
        Err(SerializationError::IllegalXmlChar(token.to_string()))
    }
}

fn write_indented_xml(root: &str, items: &[&str]) -> Result<String, SerializationError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new(root)))
        .map_err(xml_err)?;
    for item in items {
        writer
            .create_element("item")
            .write_text_content(BytesText::new(item))
            .map_err(xml_err)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(root)))
        .map_err(xml_err)?;

    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

fn xml_err<E: std::fmt::Display>(e: E) -> SerializationError {
    SerializationError::Xml(e.to_string())
}

fn write_single_line_xml(root: &str, items: &[&str]) -> String {
    let mut xml = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?><{}>", root);
    for item in items {
        xml.push_str("<item>");
        xml.push_str(&html_escape::encode_text(item));
        xml.push_str("</item>");
    }
    xml.push_str(&format!("</{}>", root));
    xml
}

fn render_summary(target: &Target, result: &TargetResult) -> String {
    let mut lines = vec![
        format!("Target: {}", target.url()),
        format!(
            "Generated: {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ),
    ];
    for category in Category::ALL {
        lines.push(format!(
            "{}: {}",
            category.summary_label(),
            result.tokens(category).len()
        ));
    }
    lines.join("\n") + "\n"
}

#[cfg(test)]
#[path = "output_writer_test.rs"]
mod tests;

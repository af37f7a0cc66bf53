// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::category::Category;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 目标处理阶段
///
/// 阶段严格按顺序推进：
/// Queued → Validating → Collecting → Classifying → Enriching → Aggregating → Writing → Done
/// 任一阶段出错都会转入 Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetPhase {
    /// 已入队
    #[default]
    Queued,
    /// 校验中
    Validating,
    /// 采集语料中
    Collecting,
    /// 分类中
    Classifying,
    /// 补充采集中
    Enriching,
    /// 聚合中
    Aggregating,
    /// 写出中
    Writing,
    /// 已完成
    Done,
    /// 已失败
    Failed,
}

impl fmt::Display for TargetPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetPhase::Queued => "queued",
            TargetPhase::Validating => "validating",
            TargetPhase::Collecting => "collecting",
            TargetPhase::Classifying => "classifying",
            TargetPhase::Enriching => "enriching",
            TargetPhase::Aggregating => "aggregating",
            TargetPhase::Writing => "writing",
            TargetPhase::Done => "done",
            TargetPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// 目标最终状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetStatus {
    Done,
    Failed {
        /// 出错时所处阶段
        phase: TargetPhase,
        /// 错误描述
        reason: String,
    },
}

/// 单个目标的处理报告
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    /// 原始输入
    pub input: String,
    /// 工作目录键（校验失败时为空）
    pub key: Option<String>,
    /// 最终状态
    pub status: TargetStatus,
    /// 各类别词条数
    pub counts: BTreeMap<Category, usize>,
    /// 成功写出的产物数
    pub artifacts_written: usize,
    /// 写出失败的产物数
    pub artifacts_failed: usize,
}

impl TargetReport {
    pub fn failed(input: &str, key: Option<String>, phase: TargetPhase, reason: String) -> Self {
        Self {
            input: input.to_string(),
            key,
            status: TargetStatus::Failed { phase, reason },
            counts: BTreeMap::new(),
            artifacts_written: 0,
            artifacts_failed: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TargetStatus::Done
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 聚合服务（aggregation_service）：按类别合并多个来源的结果
/// - 分类服务（classification_service）：把语料行分入各类别
/// - 采集服务（collector_service）：缓存判断与重试
/// - 补充采集服务（enrichment_service）：实时抓取页面恢复POST参数与脚本端点
pub mod aggregation_service;
pub mod classification_service;
pub mod collector_service;
pub mod enrichment_service;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理配置文件、环境变量与内置默认值
pub mod config;

/// 领域模块
///
/// 包含目标、类别等核心模型以及分类、聚合、补充采集服务
pub mod domain;

/// 引擎模块
///
/// 外部采集工具与页面抓取的实现
pub mod engines;

/// 基础设施模块
///
/// 产物写出
pub mod infrastructure;

/// 表示层模块
///
/// 命令行参数解析
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 单目标流水线与工作池
pub mod workers;

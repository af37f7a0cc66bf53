// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// - 领域模型（models）：目标、类别、输出产物与处理报告
/// - 服务（services）：采集、分类、补充采集与聚合
pub mod models;
pub mod services;

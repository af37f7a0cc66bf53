// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 负责把领域结果落到文件系统：多格式词表、诊断列表与摘要。
pub mod output_writer;

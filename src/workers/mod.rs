// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 单目标流水线以及限制并发目标数的工作池
pub mod manager;
pub mod pipeline;

pub use manager::WorkerManager;
pub use pipeline::TargetPipeline;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod archive_collector;
pub mod crawl_collector;
pub mod process_runner;
pub mod reqwest_engine;
pub mod traits;

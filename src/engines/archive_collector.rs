// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ArchiveSettings;
use crate::domain::models::target::Target;
use crate::engines::process_runner::{self, ProcessSpec, StdoutTarget};
use crate::engines::traits::{CorpusCollector, CorpusSource};
use crate::utils::errors::CollectionError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// 归档采集器
///
/// 把目标主机写入外部归档工具（默认 waybackurls）的标准输入，标准输出即语料
pub struct ArchiveCollector {
    settings: ArchiveSettings,
}

impl ArchiveCollector {
    pub fn new(settings: ArchiveSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl CorpusCollector for ArchiveCollector {
    fn source(&self) -> CorpusSource {
        CorpusSource::Archive
    }

    fn name(&self) -> &str {
        &self.settings.binary
    }

    async fn collect(&self, target: &Target, destination: &Path) -> Result<(), CollectionError> {
        let spec = ProcessSpec::new(&self.settings.binary)
            .stdin(format!("{}\n", target.host()))
            .stdout(StdoutTarget::File(destination.to_path_buf()))
            .timeout(self.settings.timeout.map(Duration::from_secs));
        process_runner::run(&spec).await
    }
}

// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::sync::Arc;
use tracing::{info, warn};
use wlmaker::config::settings::Settings;
use wlmaker::domain::models::report::TargetStatus;
use wlmaker::presentation::cli::{Cli, BANNER};
use wlmaker::utils::telemetry::init_telemetry;
use wlmaker::workers::{TargetPipeline, WorkerManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !cli.has_target() {
        println!("{}", BANNER);
        Cli::command().print_long_help()?;
        return Ok(());
    }

    let mut settings =
        Settings::new(cli.config.as_deref()).context("failed to load configuration")?;
    init_telemetry(&settings.logging)?;
    cli.apply(&mut settings);

    let targets = cli.targets()?;
    if targets.is_empty() {
        warn!("No targets to process");
        return Ok(());
    }

    let settings = Arc::new(settings);
    info!(
        targets = targets.len(),
        threads = settings.worker_count(),
        format = ?settings.output.format,
        output = %settings.output.base_dir.display(),
        enrichment = settings.enrichment.enabled,
        "Starting wlmaker"
    );

    let pipeline = Arc::new(
        TargetPipeline::from_settings(settings.clone())
            .context("failed to build enrichment client")?,
    );
    let manager =
        WorkerManager::new(pipeline, settings.worker_count()).with_progress(targets.len());
    let reports = manager.run(targets).await;

    for report in &reports {
        match &report.status {
            TargetStatus::Done => println!(
                "[done]   {} -> {} ({} artifacts, {} failed)",
                report.input,
                settings
                    .output
                    .base_dir
                    .join(report.key.as_deref().unwrap_or_default())
                    .display(),
                report.artifacts_written,
                report.artifacts_failed
            ),
            TargetStatus::Failed { phase, reason } => {
                println!("[failed] {} during {}: {}", report.input, phase, reason)
            }
        }
    }

    Ok(())
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::LoggingSettings;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 初始化日志
///
/// 控制台层受 `RUST_LOG` 或配置中的过滤器控制；错误日志层只接收 ERROR 级别记录，
/// 以追加方式写入错误日志文件。文件写入器由互斥锁包裹，并发 worker 的记录逐条串行落盘。
///
/// # 参数
///
/// * `settings` - 日志配置
///
/// # 返回值
///
/// * `Ok(())` - 初始化成功
/// * `Err(anyhow::Error)` - 错误日志文件无法打开，或全局订阅者已被设置
pub fn init_telemetry(settings: &LoggingSettings) -> anyhow::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter.as_str()));

    if let Some(parent) = settings.error_log.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let error_log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.error_log)?;

    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let console = if settings.json {
        console.json().boxed()
    } else {
        console.boxed()
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(error_log))
                .with_filter(LevelFilter::ERROR),
        )
        .try_init()?;

    Ok(())
}

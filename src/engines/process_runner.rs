// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::CollectionError;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// 标准输出去向
#[derive(Debug, Clone)]
pub enum StdoutTarget {
    /// 丢弃
    Discard,
    /// 写入文件（覆盖）
    File(PathBuf),
}

/// 外部进程描述
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    /// 可执行文件
    pub binary: String,
    /// 参数
    pub args: Vec<String>,
    /// 写入标准输入的内容
    pub stdin: Option<String>,
    /// 标准输出去向
    pub stdout: StdoutTarget,
    /// 超时，None 表示不限
    pub timeout: Option<Duration>,
}

impl ProcessSpec {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            stdin: None,
            stdout: StdoutTarget::Discard,
            timeout: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn stdout(mut self, target: StdoutTarget) -> Self {
        self.stdout = target;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// 运行外部进程
///
/// 超时只取消这一次调用：子进程随 future 一起被丢弃并被杀死。
///
/// # 返回值
///
/// * `Ok(())` - 进程以零状态退出
/// * `Err(CollectionError)` - 启动失败、非零退出或超时
pub async fn run(spec: &ProcessSpec) -> Result<(), CollectionError> {
    let stdout = match &spec.stdout {
        StdoutTarget::Discard => Stdio::null(),
        StdoutTarget::File(path) => Stdio::from(std::fs::File::create(path)?),
    };

    let mut command = Command::new(&spec.binary);
    command
        .args(&spec.args)
        .stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(stdout)
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(binary = %spec.binary, args = ?spec.args, "Spawning collaborator");
    let mut child = command.spawn().map_err(|source| CollectionError::Spawn {
        binary: spec.binary.clone(),
        source,
    })?;

    if let (Some(input), Some(mut pipe)) = (&spec.stdin, child.stdin.take()) {
        pipe.write_all(input.as_bytes()).await?;
        pipe.shutdown().await?;
    }

    let output = match spec.timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| CollectionError::Timeout {
                binary: spec.binary.clone(),
                timeout: limit,
            })??,
        None => child.wait_with_output().await?,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(binary = %spec.binary, stderr = %stderr.trim(), "Collaborator stderr");
        return Err(CollectionError::NonZeroExit {
            binary: spec.binary.clone(),
            code: output.status.code(),
        });
    }

    Ok(())
}

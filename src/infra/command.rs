//! # Spawn Primitive Module / 派生原语模块
//!
//! The process/stream execution primitive: spawns a prepared command and
//! captures its output streams concurrently. The caller decides through
//! `merge_streams` whether stderr joins the TAP stream or is captured as a
//! side channel. Environment is whatever the caller configured on the
//! command, typically an explicit per-child map.
//!
//! 进程/流执行原语：派生准备好的命令并并发捕获其输出流。
//! 调用方通过 `merge_streams` 决定 stderr 是并入 TAP 流还是作为
//! 旁路通道捕获。环境由调用方在命令上配置，通常是显式的每子进程映射。

use crate::infra::t;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Spawns a command and captures its stdout and stderr line by line.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The primary (TAP) stream as a `String`.
/// - The side stream as a `String`, empty when streams were merged.
///
/// 派生一个命令并逐行捕获其 stdout 和 stderr。
///
/// # Returns
/// 一个元组，包含：
/// - 进程的 `ExitStatus`（包装在 `io::Result` 中）。
/// - 主（TAP）流，为一个 `String`。
/// - 旁路流，为一个 `String`；流合并时为空。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
    merge_streams: bool,
) -> (std::io::Result<std::process::ExitStatus>, String, String) {
    let mut child = match cmd
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            // If spawning fails, we return the error and empty output.
            // 如果派生失败，我们返回错误和空输出。
            return (Err(e), String::new(), String::new());
        }
    };

    let stdout = match child.stdout.take() {
        Some(stdout) => stdout,
        None => {
            return (
                Err(std::io::Error::other(
                    t!("spawn.capture_stdout_failed").to_string(),
                )),
                String::new(),
                String::new(),
            );
        }
    };
    let stderr = match child.stderr.take() {
        Some(stderr) => stderr,
        None => {
            return (
                Err(std::io::Error::other(
                    t!("spawn.capture_stderr_failed").to_string(),
                )),
                String::new(),
                String::new(),
            );
        }
    };

    // A shared buffer lets merged stderr interleave with stdout in arrival
    // order, the way a downstream TAP consumer would see it.
    // 共享缓冲区让合并后的 stderr 按到达顺序与 stdout 交错，
    // 与下游 TAP 消费者看到的一致。
    let primary = Arc::new(tokio::sync::Mutex::new(String::new()));
    let side = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_handle = tokio::spawn(read_lines_into(stdout, Arc::clone(&primary)));
    let stderr_target = if merge_streams {
        Arc::clone(&primary)
    } else {
        Arc::clone(&side)
    };
    let stderr_handle = tokio::spawn(read_lines_into(stderr, stderr_target));

    // Wait for the process to exit, then for both readers, to ensure all
    // output is captured.
    // 等待进程退出，再等待两个读取任务，以确保捕获所有输出。
    let status = child.wait().await;

    if let Err(e) = stdout_handle.await {
        eprintln!("Failed to join stdout task: {}", e);
    }
    if let Err(e) = stderr_handle.await {
        eprintln!("Failed to join stderr task: {}", e);
    }

    let primary = primary.lock().await.clone();
    let side = side.lock().await.clone();
    (status, primary, side)
}

async fn read_lines_into(
    stream: impl AsyncRead + Unpin,
    buffer: Arc<tokio::sync::Mutex<String>>,
) {
    let reader = BufReader::new(stream);
    let mut lines = reader.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut buffer = buffer.lock().await;
        buffer.push_str(&line);
        buffer.push('\n');
    }
}

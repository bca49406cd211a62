//! # Program Execution Module / 程序执行模块
//!
//! The default execution flow for one test program: build its command and
//! environment scope, launch it through the spawn primitive with an explicit
//! per-child environment, and fold the captured TAP stream into a result.
//! Only `ok` / `not ok` leading tokens are counted here; full TAP grammar
//! belongs to the external parser collaborator.
//!
//! 单个测试程序的默认执行流程：构建其命令和环境作用域，
//! 通过派生原语以显式的每子进程环境启动它，并将捕获的 TAP 流折叠为结果。
//! 这里只统计 `ok` / `not ok` 行首记号；完整的 TAP 语法属于外部解析协作方。

use anyhow::{Context, Result, anyhow};
use std::time::Instant;

use crate::core::invocation::CommandBuilder;
use crate::core::models::{FailureReason, InvocationArguments, ProgramResult, TestProgram};
use crate::infra::command::spawn_and_capture;

/// Runs one test program to completion under the given argument table.
/// The environment scope lives until after the child has been reaped, so
/// teardown is guaranteed on every exit path including spawn failure.
///
/// 在给定参数表下将单个测试程序运行至结束。
/// 环境作用域存活到子进程被回收之后，因此在包括派生失败在内的
/// 所有退出路径上都保证执行 teardown。
pub async fn run_program(
    builder: &CommandBuilder,
    program: TestProgram,
    arguments: &InvocationArguments,
) -> Result<ProgramResult> {
    let explicit_switches = arguments.switches.clone().unwrap_or_default();
    let (command, scope) = builder.build(&program, &explicit_switches)?;
    let merge_streams = arguments.merge.unwrap_or(false);

    // The rendered line is re-split shell-style, so quoted switches survive
    // as single argv elements.
    // 渲染后的命令行按 shell 规则重新拆分，带引号的开关保持为单个 argv 元素。
    let rendered = command.command_line();
    let parts = shlex::split(&rendered)
        .ok_or_else(|| anyhow!("Failed to parse command line: {}", rendered))?;
    if parts.is_empty() {
        return Err(anyhow!("Empty command line for {}", program.path));
    }

    let mut cmd = tokio::process::Command::new(&parts[0]);
    cmd.args(&parts[1..])
        .envs(scope.child_env())
        .kill_on_drop(true);

    let start = Instant::now();
    let (status_res, tap_stream, side_stream) = spawn_and_capture(cmd, merge_streams).await;
    let duration = start.elapsed();
    drop(scope);

    let status = status_res
        .with_context(|| format!("Failed to get process status for '{}'", program.path))?;

    let (tests_run, tests_failed) = tally_tap_stream(&tap_stream);

    let mut output = tap_stream;
    if !side_stream.is_empty() {
        output.push_str(&side_stream);
    }

    if status.success() && tests_failed == 0 {
        Ok(ProgramResult::Passed {
            program,
            output,
            tests_run,
            duration,
        })
    } else {
        let reason = if tests_failed > 0 {
            FailureReason::TestFailed
        } else {
            FailureReason::NonZeroExit
        };
        Ok(ProgramResult::Failed {
            program,
            output,
            tests_run,
            tests_failed,
            reason,
            duration,
        })
    }
}

/// Counts result lines in a captured stream: `(tests_run, tests_failed)`.
/// 统计捕获流中的结果行：`(tests_run, tests_failed)`。
pub fn tally_tap_stream(stream: &str) -> (usize, usize) {
    let mut run = 0;
    let mut failed = 0;
    for line in stream.lines() {
        let line = line.trim_start();
        if let Some(rest) = line.strip_prefix("not ok") {
            if is_result_boundary(rest) {
                run += 1;
                failed += 1;
            }
        } else if let Some(rest) = line.strip_prefix("ok") {
            if is_result_boundary(rest) {
                run += 1;
            }
        }
    }
    (run, failed)
}

/// `ok`/`not ok` must end the token there: `okay 1` is not a result line.
/// `ok`/`not ok` 的记号必须在此结束：`okay 1` 不是结果行。
fn is_result_boundary(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t')
}

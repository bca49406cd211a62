// src/commands/run.rs

use anyhow::Result;
use colored::*;
use futures::{StreamExt, stream};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{self, RunOptions},
        execution::run_program,
        invocation::CommandBuilder,
        models::{FailureReason, ProgramResult, RunSummary, TestProgram},
        planner::{self, SeededShuffle},
        shebang::ShebangCache,
    },
    infra::t,
    reporting::{ConsoleFormatter, Formatter},
};

pub async fn execute(mut options: RunOptions, jobs: Option<usize>, config: PathBuf) -> Result<()> {
    // File defaults sit under CLI values; the file also picks the locale,
    // like any other run default.
    // 文件默认值位于 CLI 值之下；locale 也和其他运行默认值一样由文件选定。
    if let Some(defaults) = config::load_defaults(&config)? {
        rust_i18n::set_locale(&defaults.language);
        options.merge_defaults(&defaults.options);
    }
    let locale = rust_i18n::locale().to_string();

    if options.argv.is_empty() {
        anyhow::bail!(t!("run.no_programs", locale = &locale));
    }

    let mut shuffler = SeededShuffle::from_entropy();
    let mut plan = planner::plan_invocation(&options, &mut shuffler)?;

    let overall_stop_token = setup_signal_handler(&locale)?;

    let shebang = Arc::new(ShebangCache::new());
    let builder =
        CommandBuilder::new(shebang).with_exec_override(plan.arguments.exec.clone());

    // `-j 0` means one slot per core; unset means strictly ordered output.
    // `-j 0` 表示每核一个槽位；未设置表示严格有序的输出。
    let jobs = match jobs {
        Some(0) => num_cpus::get(),
        Some(n) => n,
        None => 1,
    };

    let mut formatter: Box<dyn Formatter + Send> = plan
        .arguments
        .formatter
        .take()
        .unwrap_or_else(|| Box::new(ConsoleFormatter::from_options(&options)));

    formatter.session_begin(&plan.programs);

    let results = run_programs(
        &builder,
        &plan.arguments,
        &plan.programs,
        jobs,
        overall_stop_token,
        formatter.as_mut(),
    )
    .await;

    let summary = RunSummary::new(results);
    formatter.session_end(&summary);

    if summary.all_passed() {
        Ok(())
    } else {
        anyhow::bail!(t!(
            "run.failed",
            locale = &locale,
            failed = summary.failed_count()
        ));
    }
}

fn setup_signal_handler(locale: &str) -> Result<CancellationToken> {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        signal::ctrl_c().await.expect("Failed to listen for Ctrl-C");
        println!("\n{}", t!("run.shutdown_signal", locale = &locale).yellow());
        token_clone.cancel();
    });

    Ok(token)
}

async fn run_programs(
    builder: &CommandBuilder,
    arguments: &crate::core::models::InvocationArguments,
    programs: &[String],
    jobs: usize,
    overall_stop_token: CancellationToken,
    formatter: &mut dyn Formatter,
) -> Vec<ProgramResult> {
    let stream = stream::iter(programs.iter().cloned().map(|path| {
        let stop_token = overall_stop_token.clone();
        async move {
            let program = TestProgram::new(path);
            // A cancelled run must not launch (or set up scopes for) any
            // further programs.
            // 已取消的运行不得再启动任何程序（也不得为其建立作用域）。
            if stop_token.is_cancelled() {
                return ProgramResult::Skipped { program };
            }
            match run_program(builder, program.clone(), arguments).await {
                Ok(result) => result,
                Err(e) => ProgramResult::Failed {
                    program,
                    output: e.to_string(),
                    tests_run: 0,
                    tests_failed: 0,
                    reason: FailureReason::LaunchFailed,
                    duration: Duration::default(),
                },
            }
        }
    }));

    let mut results = Vec::with_capacity(programs.len());
    let mut completed = stream.buffer_unordered(jobs);
    while let Some(result) = completed.next().await {
        formatter.program_result(&result);
        results.push(result);
    }
    drop(completed);

    // Completion order is arbitrary under -j; the summary follows the plan.
    // -j 下完成顺序是任意的；摘要按计划顺序排列。
    results.sort_by_key(|result| {
        programs
            .iter()
            .position(|p| p == result.program_path())
            .unwrap_or(usize::MAX)
    });
    results
}

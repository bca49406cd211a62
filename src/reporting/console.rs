//! # Console Reporting Module / 控制台报告模块
//!
//! The built-in formatter pair: a plain console formatter and its
//! color-capable variant, behind the `Formatter` capability trait consumed
//! by the harness-invocation primitive. Verbosity, failure filtering and
//! directive display all live here, away from the invocation layer.
//!
//! 内建的 formatter 对：普通控制台 formatter 及其支持颜色的变体，
//! 位于 harness 调用原语消费的 `Formatter` 能力 trait 之后。
//! 详细程度、失败过滤和指令显示都在这里，与调用层分离。

use crate::core::config::RunOptions;
use crate::core::models::{ProgramResult, RunSummary};
use crate::infra::t;
use colored::*;

/// The capability contract a constructed formatter must satisfy: it receives
/// the program list up front, every per-program result as it completes, and
/// the final aggregate.
///
/// 构造出的 formatter 必须满足的能力契约：预先接收程序列表、
/// 每个程序完成时的结果，以及最终汇总。
pub trait Formatter {
    fn session_begin(&mut self, programs: &[String]);
    fn program_result(&mut self, result: &ProgramResult);
    fn session_end(&mut self, summary: &RunSummary);
}

/// Console output in the runner's house style. `color: false` is the plain
/// variant; `color: true` the color-capable one.
///
/// 运行器风格的控制台输出。`color: false` 为普通变体；
/// `color: true` 为支持颜色的变体。
pub struct ConsoleFormatter {
    color: bool,
    verbose: bool,
    quiet: bool,
    really_quiet: bool,
    failures_only: bool,
    directives: bool,
    locale: String,
}

impl ConsoleFormatter {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            verbose: false,
            quiet: false,
            really_quiet: false,
            failures_only: false,
            directives: false,
            locale: rust_i18n::locale().to_string(),
        }
    }

    /// Derives the formatter's display behavior from the run options.
    /// 从运行选项派生 formatter 的显示行为。
    pub fn from_options(options: &RunOptions) -> Self {
        Self {
            color: options.color.unwrap_or(false),
            verbose: options.verbose.unwrap_or(false),
            quiet: options.quiet.unwrap_or(false),
            really_quiet: options.really_quiet.unwrap_or(false),
            failures_only: options.failures.unwrap_or(false),
            directives: options.directives.unwrap_or(false),
            locale: rust_i18n::locale().to_string(),
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Formatter for ConsoleFormatter {
    fn session_begin(&mut self, programs: &[String]) {
        if self.really_quiet || self.quiet {
            return;
        }
        println!(
            "{}",
            t!(
                "report.session_begin",
                locale = &self.locale,
                count = programs.len()
            )
        );
    }

    fn program_result(&mut self, result: &ProgramResult) {
        // --QUIET keeps everything but the final summary off the console;
        // --failures drops passing programs.
        // --QUIET 使最终摘要之外的一切不上控制台；--failures 丢弃通过的程序。
        if self.really_quiet {
            return;
        }
        if self.failures_only && !result.is_failure() {
            return;
        }

        let path = result.program_path();
        match result {
            ProgramResult::Passed {
                tests_run,
                duration,
                ..
            } => {
                if !self.quiet {
                    println!(
                        "{} {} ({}, {:.2?})",
                        self.paint("ok", Color::Green),
                        path,
                        t!("report.tests_run", locale = &self.locale, count = tests_run),
                        duration
                    );
                }
            }
            ProgramResult::Failed {
                tests_run,
                tests_failed,
                duration,
                ..
            } => {
                println!(
                    "{} {} ({}/{} {}, {:.2?})",
                    self.paint("not ok", Color::Red),
                    path,
                    tests_failed,
                    tests_run,
                    t!("report.tests_failed", locale = &self.locale),
                    duration
                );
            }
            ProgramResult::Skipped { .. } => {
                println!("{} {}", self.paint("skipped", Color::Yellow), path);
            }
        }

        if self.verbose || result.is_failure() {
            for line in result.get_output().lines() {
                println!("  {}", line);
            }
        } else if self.directives {
            // Directive lines are worth surfacing even in a terse run.
            // 即使在简洁模式下，指令行也值得呈现。
            for line in result.get_output().lines() {
                if line.contains("# TODO") || line.contains("# SKIP") {
                    println!("  {}", line);
                }
            }
        }
    }

    fn session_end(&mut self, summary: &RunSummary) {
        println!(
            "\n{}",
            self.paint_bold(&t!("report.summary_banner", locale = &self.locale))
        );

        for result in &summary.results {
            let status = result.status_str(&self.locale);
            let status = match result {
                ProgramResult::Passed { .. } => self.paint(&status, Color::Green),
                ProgramResult::Failed { .. } => self.paint(&status, Color::Red),
                ProgramResult::Skipped { .. } => {
                    if self.color {
                        status.dimmed().to_string()
                    } else {
                        status
                    }
                }
            };
            let duration = result
                .get_duration()
                .map(|d| format!("{:.2?}", d))
                .unwrap_or_else(|| "N/A".to_string());
            println!(
                "  - {:<10} | {:<40} | {:>10}",
                status,
                result.program_path(),
                duration
            );
        }

        let totals = t!(
            "report.totals",
            locale = &self.locale,
            programs = summary.results.len(),
            tests = summary.tests_run(),
            failed = summary.failed_count()
        );
        if summary.all_passed() {
            println!("{}", self.paint(&totals, Color::Green));
        } else {
            println!("{}", self.paint(&totals, Color::Red));
        }
    }
}

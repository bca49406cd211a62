//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the
//! invocation layer: test programs, assembled commands, the derived argument
//! table for the harness-invocation primitive, and per-program results.
//!
//! 此模块定义整个调用层使用的核心数据结构：测试程序、组装好的命令、
//! 传给 harness 调用原语的派生参数表，以及每个程序的结果。

use crate::core::invocation::quote_switch;
use crate::infra::t;
use crate::reporting::Formatter;
use std::fmt;
use std::time::Duration;

/// One test program to invoke: a path plus its own trailing arguments.
/// 要调用的单个测试程序：路径加上其自身的尾随参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestProgram {
    pub path: String,
    pub args: Vec<String>,
}

impl TestProgram {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(path: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            path: path.into(),
            args,
        }
    }
}

/// A fully assembled invocation: executable, composed switches, the test
/// program and its arguments. Immutable once built; owned by exactly one
/// launch and discarded afterwards.
///
/// 完整组装的调用：可执行文件、组合好的开关、测试程序及其参数。
/// 一旦构建即不可变；只属于一次启动，用后即弃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub executable: String,
    pub switches: Vec<String>,
    pub program_path: String,
    pub program_args: Vec<String>,
}

impl Command {
    /// The raw argument vector: `[executable] + switches + [path] + args`.
    /// 原始参数向量：`[executable] + switches + [path] + args`。
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(2 + self.switches.len() + self.program_args.len());
        argv.push(self.executable.clone());
        argv.extend(self.switches.iter().cloned());
        argv.push(self.program_path.clone());
        argv.extend(self.program_args.iter().cloned());
        argv
    }

    /// Renders a shell-splittable command line. Switches already carry their
    /// quoting; the executable, program path and arguments are quoted here if
    /// they contain whitespace.
    ///
    /// 渲染一条可按 shell 规则拆分的命令行。开关已带引号；
    /// 可执行文件、程序路径和参数若含空白则在此处加引号。
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(2 + self.switches.len() + self.program_args.len());
        parts.push(quote_switch(&self.executable));
        parts.extend(self.switches.iter().cloned());
        parts.push(quote_switch(&self.program_path));
        parts.extend(self.program_args.iter().map(|a| quote_switch(a)));
        parts.join(" ")
    }
}

/// The built-in harnesses a selector string may name.
/// 选择器字符串可指名的内建 harness。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessSelector {
    /// The plain TAP-consuming harness.
    /// 普通的 TAP 消费 harness。
    Tap,
}

impl HarnessSelector {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tap" => Some(HarnessSelector::Tap),
            _ => None,
        }
    }
}

/// The keyword-argument table consumed by the harness-invocation primitive.
/// Every key appears only when the corresponding run option was set; an unset
/// option contributes nothing. This is a pure, deterministic projection of
/// the run options.
///
/// harness 调用原语消费的关键字参数表。每个键只在对应的运行选项被设置时
/// 出现；未设置的选项不产生任何内容。这是运行选项的纯确定性投影。
#[derive(Default)]
pub struct InvocationArguments {
    /// Library search directories, in declaration order.
    /// 库搜索目录，按声明顺序。
    pub lib: Option<Vec<String>>,
    /// Interpreter switch letters requested for every program.
    /// 为每个程序请求的解释器开关字母。
    pub switches: Option<Vec<String>>,
    /// Surface parse errors. The public option is named `parse`; the
    /// primitive's key is `errors`.
    /// 暴露解析错误。公开选项名为 `parse`，原语的键为 `errors`。
    pub errors: Option<bool>,
    /// Interpreter override, always carried as a list.
    /// 解释器覆盖，始终以列表形式携带。
    pub exec: Option<Vec<String>>,
    pub directives: Option<bool>,
    pub failures: Option<bool>,
    pub merge: Option<bool>,
    pub quiet: Option<bool>,
    pub really_quiet: Option<bool>,
    pub verbose: Option<bool>,
    /// A constructed formatter instance, when a selector or color choice was
    /// given.
    /// 当给出选择器或颜色选择时，构造好的 formatter 实例。
    pub formatter: Option<Box<dyn Formatter + Send>>,
    pub harness: Option<HarnessSelector>,
}

impl InvocationArguments {
    /// True when no run option contributed anything to the table.
    /// 当没有任何运行选项向表中贡献内容时为真。
    pub fn is_empty(&self) -> bool {
        self.lib.is_none()
            && self.switches.is_none()
            && self.errors.is_none()
            && self.exec.is_none()
            && self.directives.is_none()
            && self.failures.is_none()
            && self.merge.is_none()
            && self.quiet.is_none()
            && self.really_quiet.is_none()
            && self.verbose.is_none()
            && self.formatter.is_none()
            && self.harness.is_none()
    }
}

impl fmt::Debug for InvocationArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationArguments")
            .field("lib", &self.lib)
            .field("switches", &self.switches)
            .field("errors", &self.errors)
            .field("exec", &self.exec)
            .field("directives", &self.directives)
            .field("failures", &self.failures)
            .field("merge", &self.merge)
            .field("quiet", &self.quiet)
            .field("really_quiet", &self.really_quiet)
            .field("verbose", &self.verbose)
            .field("formatter", &self.formatter.as_ref().map(|_| "<formatter>"))
            .field("harness", &self.harness)
            .finish()
    }
}

/// Why a program counted as failed.
/// 程序被计为失败的原因。
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FailureReason {
    /// One or more of its test lines reported `not ok`.
    /// 它的一个或多个测试行报告了 `not ok`。
    TestFailed,
    /// The program exited non-zero without a failing test line.
    /// 程序以非零状态退出，但没有失败的测试行。
    NonZeroExit,
    /// The subprocess could not be launched or observed.
    /// 子进程无法启动或无法观测。
    LaunchFailed,
}

/// The outcome of running one test program.
/// 运行单个测试程序的结果。
#[derive(Debug, Clone)]
pub enum ProgramResult {
    Passed {
        program: TestProgram,
        output: String,
        tests_run: usize,
        duration: Duration,
    },
    Failed {
        program: TestProgram,
        output: String,
        tests_run: usize,
        tests_failed: usize,
        reason: FailureReason,
        duration: Duration,
    },
    /// The run was cancelled before this program launched.
    /// 本程序启动前运行已被取消。
    Skipped { program: TestProgram },
}

impl ProgramResult {
    pub fn program_path(&self) -> &str {
        match self {
            ProgramResult::Passed { program, .. } => &program.path,
            ProgramResult::Failed { program, .. } => &program.path,
            ProgramResult::Skipped { program } => &program.path,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ProgramResult::Failed { .. })
    }

    pub fn tests_run(&self) -> usize {
        match self {
            ProgramResult::Passed { tests_run, .. } => *tests_run,
            ProgramResult::Failed { tests_run, .. } => *tests_run,
            ProgramResult::Skipped { .. } => 0,
        }
    }

    pub fn get_duration(&self) -> Option<Duration> {
        match self {
            ProgramResult::Passed { duration, .. } => Some(*duration),
            ProgramResult::Failed { duration, .. } => Some(*duration),
            ProgramResult::Skipped { .. } => None,
        }
    }

    pub fn get_output(&self) -> &str {
        match self {
            ProgramResult::Passed { output, .. } => output,
            ProgramResult::Failed { output, .. } => output,
            ProgramResult::Skipped { .. } => "",
        }
    }

    /// The status label for display.
    /// 用于显示的状态标签。
    pub fn status_str(&self, locale: &str) -> String {
        match self {
            ProgramResult::Passed { .. } => t!("report.status_passed", locale = locale).to_string(),
            ProgramResult::Failed { .. } => t!("report.status_failed", locale = locale).to_string(),
            ProgramResult::Skipped { .. } => {
                t!("report.status_skipped", locale = locale).to_string()
            }
        }
    }
}

/// The run-level aggregate consumed by formatters after all programs finish.
/// 所有程序结束后由 formatter 消费的运行级汇总。
#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<ProgramResult>,
}

impl RunSummary {
    pub fn new(results: Vec<ProgramResult>) -> Self {
        Self { results }
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    pub fn passed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, ProgramResult::Passed { .. }))
            .count()
    }

    pub fn tests_run(&self) -> usize {
        self.results.iter().map(|r| r.tests_run()).sum()
    }

    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }
}

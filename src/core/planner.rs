//! # Invocation Planner Module / 调用计划模块
//!
//! This module maps a run-options record to the keyword-argument table
//! consumed by the harness-invocation primitive and to the ordered (or
//! reordered) list of test-program identifiers. The projection is pure and
//! deterministic apart from the injected shuffle strategy.
//!
//! 此模块将运行选项记录映射为 harness 调用原语消费的关键字参数表，
//! 以及有序（或重排后）的测试程序标识符列表。
//! 除注入的洗牌策略外，该投影是纯且确定性的。

use crate::core::config::RunOptions;
use crate::core::errors::RunnerError;
use crate::core::models::{HarnessSelector, InvocationArguments};
use crate::infra::t;
use crate::reporting::ConsoleFormatter;
use colored::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// The resolver output pair: the argument table for one run, and the program
/// identifiers in final execution order.
/// 解析器的输出对：单次运行的参数表，以及按最终执行顺序排列的程序标识符。
#[derive(Debug)]
pub struct InvocationPlan {
    pub arguments: InvocationArguments,
    pub programs: Vec<String>,
}

/// A replaceable reordering capability, so tests can supply a deterministic
/// fake. The default is a seedable uniform permutation.
///
/// 可替换的重排能力，使测试可以提供确定性的假实现。
/// 默认实现是可设种子的均匀排列。
pub trait ShuffleStrategy {
    fn shuffle(&mut self, programs: &mut [String]);
}

/// Uniform random permutation over a seedable generator.
/// 基于可设种子生成器的均匀随机排列。
pub struct SeededShuffle {
    rng: Xoshiro256PlusPlus,
}

impl SeededShuffle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// A shuffle seeded from the thread-local generator, for ordinary runs.
    /// 由线程本地生成器设定种子的洗牌，用于普通运行。
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }
}

impl ShuffleStrategy for SeededShuffle {
    fn shuffle(&mut self, programs: &mut [String]) {
        programs.shuffle(&mut self.rng);
    }
}

/// Derives the argument table and the ordered program list from the run
/// options. Each mapping applies only when the source field is set; unset
/// fields contribute nothing.
///
/// 从运行选项派生参数表和有序程序列表。
/// 每条映射仅在源字段被设置时生效；未设置的字段不产生任何内容。
///
/// # Errors
/// `RunnerError::Configuration` if both reordering policies are requested;
/// selector resolution itself never fails.
pub fn plan_invocation(
    options: &RunOptions,
    shuffler: &mut dyn ShuffleStrategy,
) -> Result<InvocationPlan, RunnerError> {
    if options.reverse.unwrap_or(false) && options.shuffle.unwrap_or(false) {
        return Err(RunnerError::Configuration(
            "--reverse and --shuffle are mutually exclusive".to_string(),
        ));
    }

    let mut arguments = InvocationArguments::default();

    // Library search directories: --lib first, then --blib, then explicit
    // includes, additive in declaration order.
    // 库搜索目录：先 --lib，再 --blib，然后显式 includes，按声明顺序累加。
    let mut lib_dirs: Vec<String> = Vec::new();
    if options.lib.unwrap_or(false) {
        lib_dirs.push("lib".to_string());
    }
    if options.blib.unwrap_or(false) {
        lib_dirs.push("blib/lib".to_string());
    }
    for dir in &options.includes {
        lib_dirs.push(shellexpand::tilde(dir).into_owned());
    }
    if !lib_dirs.is_empty() {
        arguments.lib = Some(lib_dirs);
    }

    let mut switches: Vec<String> = Vec::new();
    if options.taint_fail.unwrap_or(false) {
        switches.push("T".to_string());
    }
    if options.taint_warn.unwrap_or(false) {
        switches.push("t".to_string());
    }
    if options.warnings_fail.unwrap_or(false) {
        switches.push("W".to_string());
    }
    if options.warnings_warn.unwrap_or(false) {
        switches.push("w".to_string());
    }
    if !switches.is_empty() {
        arguments.switches = Some(switches);
    }

    // The public option is `parse`; the primitive expects `errors`.
    // 公开选项名为 `parse`；原语期望的键是 `errors`。
    if options.parse.unwrap_or(false) {
        arguments.errors = Some(true);
    }

    // The exec override is carried as a list even when given as a scalar.
    // exec 覆盖即使以标量给出也以列表形式携带。
    if let Some(exec) = &options.exec {
        arguments.exec = Some(vec![exec.clone()]);
    }

    arguments.directives = options.directives;
    arguments.failures = options.failures;
    arguments.merge = options.merge;
    arguments.quiet = options.quiet;
    arguments.really_quiet = options.really_quiet;
    arguments.verbose = options.verbose;

    if options.formatter.is_some() || options.color.is_some() {
        arguments.formatter = Some(select_formatter(options));
    }
    if let Some(name) = &options.harness {
        arguments.harness = Some(select_harness(name));
    }

    let mut programs = options.argv.clone();
    if options.reverse.unwrap_or(false) {
        programs.reverse();
    } else if options.shuffle.unwrap_or(false) {
        shuffler.shuffle(&mut programs);
    }

    Ok(InvocationPlan {
        arguments,
        programs,
    })
}

/// Constructs the formatter a selector names. An unknown name falls back to
/// the built-in console formatter with a warning; planning never fails on a
/// selector.
///
/// 构造选择器指名的 formatter。未知名称回退到内建控制台 formatter
/// 并给出警告；计划阶段从不因选择器而失败。
fn select_formatter(options: &RunOptions) -> Box<dyn crate::reporting::Formatter + Send> {
    match options.formatter.as_deref() {
        None | Some("console") => Box::new(ConsoleFormatter::from_options(options)),
        Some(other) => {
            eprintln!("{}", t!("plan.unknown_formatter", name = other).yellow());
            Box::new(ConsoleFormatter::from_options(options))
        }
    }
}

fn select_harness(name: &str) -> HarnessSelector {
    match HarnessSelector::from_name(name) {
        Some(selector) => selector,
        None => {
            eprintln!("{}", t!("plan.unknown_harness", name = name).yellow());
            HarnessSelector::Tap
        }
    }
}

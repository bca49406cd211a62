//! # Command Construction Module / 命令构建模块
//!
//! Per-test command construction: resolves the interpreter executable,
//! composes include-path switches, detects and re-propagates an isolation
//! mode declared in the test program's own shebang line, quotes switches,
//! and derives the environment scope for the launch.
//!
//! 每个测试的命令构建：解析解释器可执行文件、组合包含路径开关、
//! 检测并重新传播测试程序自身 shebang 行声明的隔离模式、为开关加引号，
//! 并为启动派生环境作用域。

use crate::core::env::{
    EnvScope, INTERPRETER_ENV_VAR, LIB_ENV_VAR, OPTIONS_ENV_VAR, PATH_LIST_SEPARATOR,
};
use crate::core::errors::RunnerError;
use crate::core::models::{Command, TestProgram};
use crate::core::shebang::ShebangCache;
use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Matches an interpreter directive whose first flag cluster could declare an
/// isolation mode, e.g. `#!/usr/bin/env tapscript -wT`.
/// 匹配首个标志簇可能声明隔离模式的解释器指令，例如 `#!/usr/bin/env tapscript -wT`。
static ISOLATION_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#!.*?\s-(\w*[Tt]\w*)").expect("isolation directive pattern"));

/// Resolves the interpreter executable for a test program. Injected into
/// `CommandBuilder` so embedders can replace the policy without subclassing.
///
/// 为测试程序解析解释器可执行文件。注入到 `CommandBuilder` 中，
/// 使嵌入方无需继承即可替换该策略。
pub trait ExecutableResolver: Send + Sync {
    fn resolve(&self, program: &TestProgram) -> Result<String, RunnerError>;
}

/// Default resolution: the `TAPRUN_INTERPRETER` override wins; otherwise the
/// currently running executable stands in as the interpreter.
///
/// 默认解析：`TAPRUN_INTERPRETER` 覆盖优先；否则以当前运行的可执行文件
/// 充当解释器。
pub struct DefaultResolver;

impl ExecutableResolver for DefaultResolver {
    fn resolve(&self, _program: &TestProgram) -> Result<String, RunnerError> {
        if let Ok(exe) = env::var(INTERPRETER_ENV_VAR) {
            if !exe.trim().is_empty() {
                return Ok(normalize_executable(exe));
            }
        }
        let exe = env::current_exe().map_err(|_| RunnerError::NoCommand)?;
        let exe = exe.to_str().ok_or(RunnerError::NoCommand)?.to_string();
        if exe.is_empty() {
            return Err(RunnerError::NoCommand);
        }
        Ok(normalize_executable(exe))
    }
}

/// Platform-specific executable normalization, isolated here so the rest of
/// the builder stays platform-agnostic.
#[cfg(not(windows))]
fn normalize_executable(path: String) -> String {
    path
}

/// On Windows, canonicalized paths carry a verbatim prefix that breaks when
/// re-parsed from a quoted command line; strip it.
/// 在 Windows 上，规范化路径带有逐字前缀，从带引号的命令行重新解析时会
/// 出错；在此去除。
#[cfg(windows)]
fn normalize_executable(path: String) -> String {
    path.strip_prefix(r"\\?\")
        .map(str::to_string)
        .unwrap_or(path)
}

/// Builds one `Command` + `EnvScope` pair per test program. The shebang cache
/// and the executable-resolution strategy are injected at construction time.
///
/// 为每个测试程序构建一个 `Command` + `EnvScope` 对。
/// shebang 缓存和可执行文件解析策略在构造时注入。
pub struct CommandBuilder {
    shebang: Arc<ShebangCache>,
    resolver: Box<dyn ExecutableResolver>,
    exec_override: Option<Vec<String>>,
}

impl CommandBuilder {
    pub fn new(shebang: Arc<ShebangCache>) -> Self {
        Self {
            shebang,
            resolver: Box::new(DefaultResolver),
            exec_override: None,
        }
    }

    /// Replaces the interpreter-resolution strategy.
    /// 替换解释器解析策略。
    pub fn with_resolver(mut self, resolver: Box<dyn ExecutableResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Uses the run's exec override instead of resolving an interpreter. The
    /// first word becomes the executable, the rest lead the switch list.
    /// 使用本次运行的 exec 覆盖而非解析解释器。
    /// 第一个词成为可执行文件，其余词置于开关列表之前。
    pub fn with_exec_override(mut self, exec: Option<Vec<String>>) -> Self {
        self.exec_override = exec;
        self
    }

    /// Assembles the command vector and environment scope for one program.
    ///
    /// 为单个程序组装命令向量和环境作用域。
    ///
    /// # Errors
    /// `SourceNotFound` if the program path does not reference an existing
    /// file; `NoCommand` if executable resolution yields no usable path.
    pub fn build(
        &self,
        program: &TestProgram,
        explicit_switches: &[String],
    ) -> Result<(Command, EnvScope), RunnerError> {
        if !Path::new(&program.path).is_file() {
            return Err(RunnerError::SourceNotFound(PathBuf::from(&program.path)));
        }

        let (executable, mut switches) = self.resolve_executable(program)?;

        // Caller switches keep their declared order, normalized to flag form.
        // 调用方的开关保持声明顺序，并规范化为标志形式。
        switches.extend(explicit_switches.iter().map(|s| normalize_switch(s)));

        // An isolation flag declared in the program's own shebang line is
        // re-propagated; only the first matching letter is used.
        // 程序自身 shebang 行声明的隔离标志会被重新传播；只使用第一个匹配字母。
        let isolation = self
            .shebang
            .first_line(Path::new(&program.path))
            .as_deref()
            .and_then(isolation_switch);
        if let Some(flag) = isolation {
            switches.push(flag.to_string());
        }

        // Quoting runs after isolation derivation and before assembly.
        // 引号处理在隔离派生之后、组装之前进行。
        for switch in &mut switches {
            *switch = quote_switch(switch);
        }

        let mut lib_dirs = include_dirs(&switches);
        if let Ok(existing) = env::var(LIB_ENV_VAR) {
            lib_dirs.extend(
                existing
                    .split(PATH_LIST_SEPARATOR)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string),
            );
        }

        // An isolated interpreter does not trust its environment: re-issue
        // the search path as -I switches and forward pending options verbatim.
        // 隔离的解释器不信任其环境：将搜索路径重新作为 -I 开关下发，
        // 并原样转发待定选项。
        if isolation.is_some() {
            for dir in &lib_dirs {
                switches.push(quote_switch(&format!("-I{}", dir)));
            }
            if let Ok(options) = env::var(OPTIONS_ENV_VAR) {
                if !options.is_empty() {
                    switches.push(options);
                }
            }
        }

        let scope_value = if lib_dirs.is_empty() {
            None
        } else {
            Some(lib_dirs.join(&PATH_LIST_SEPARATOR.to_string()))
        };
        let scope = EnvScope::new(LIB_ENV_VAR, scope_value);

        let command = Command {
            executable,
            switches,
            program_path: program.path.clone(),
            program_args: program.args.clone(),
        };
        Ok((command, scope))
    }

    fn resolve_executable(
        &self,
        program: &TestProgram,
    ) -> Result<(String, Vec<String>), RunnerError> {
        match &self.exec_override {
            Some(exec) if !exec.is_empty() => {
                let mut parts: Vec<String> = exec
                    .iter()
                    .flat_map(|entry| {
                        shlex::split(entry).unwrap_or_else(|| vec![entry.clone()])
                    })
                    .collect();
                if parts.is_empty() {
                    return Err(RunnerError::NoCommand);
                }
                let executable = parts.remove(0);
                Ok((executable, parts))
            }
            _ => Ok((self.resolver.resolve(program)?, Vec::new())),
        }
    }
}

/// Tokens without a leading `-` are switch letters from the argument table;
/// normalize them to flag form. Already-flagged or quoted tokens pass through.
/// 不带前导 `-` 的记号是参数表中的开关字母；将其规范化为标志形式。
/// 已带标志或引号的记号原样通过。
fn normalize_switch(token: &str) -> String {
    if token.starts_with('-') || token.starts_with('"') {
        token.to_string()
    } else {
        format!("-{}", token)
    }
}

/// Wraps a switch in one layer of double quotes when it contains whitespace.
/// A fully quoted switch is left unchanged.
/// 当开关包含空白时，为其加一层双引号。已完整加引号的开关保持不变。
pub fn quote_switch(switch: &str) -> String {
    let fully_quoted = switch.len() >= 2 && switch.starts_with('"') && switch.ends_with('"');
    if fully_quoted {
        return switch.to_string();
    }
    if switch.chars().any(char::is_whitespace) {
        format!("\"{}\"", switch)
    } else {
        switch.to_string()
    }
}

/// The isolation switch a shebang line declares, if any. `T` outranks `t`
/// only by position: the first isolation letter in the flag cluster wins.
/// shebang 行声明的隔离开关（如有）。`T` 并不优先于 `t`，
/// 只看位置：标志簇中第一个隔离字母胜出。
fn isolation_switch(line: &str) -> Option<&'static str> {
    let captures = ISOLATION_DIRECTIVE.captures(line)?;
    let cluster = captures.get(1)?.as_str();
    cluster.chars().find_map(|c| match c {
        'T' => Some("-T"),
        't' => Some("-t"),
        _ => None,
    })
}

/// Collects the paths of `-I<path>` switches. Values already containing the
/// platform path-list separator are pre-joined lists, not single directories,
/// and are skipped.
/// 收集 `-I<path>` 开关中的路径。已含平台路径列表分隔符的值是预先拼接的
/// 列表而非单个目录，跳过。
fn include_dirs(switches: &[String]) -> Vec<String> {
    switches
        .iter()
        .map(|switch| switch.trim_matches('"'))
        .filter_map(|switch| switch.strip_prefix("-I"))
        .filter(|path| !path.is_empty() && !path.contains(PATH_LIST_SEPARATOR))
        .map(str::to_string)
        .collect()
}

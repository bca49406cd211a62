//! # Environment Scope Module / 环境作用域模块
//!
//! Scoped mutation of the library-search environment variable around a single
//! subprocess launch. The preferred path never touches the process-wide
//! environment at all: `child_env` yields an explicit per-child map for the
//! spawn primitive. `apply`/`restore` remain for callers that need true OS
//! environment inheritance, with release guaranteed on every exit path.
//!
//! 围绕单次子进程启动对库搜索环境变量进行作用域化修改。
//! 首选路径完全不触碰进程级环境：`child_env` 为派生原语产生显式的
//! 每子进程映射。`apply`/`restore` 保留给需要真正 OS 环境继承的调用方，
//! 并保证在所有退出路径上都会释放。

use std::env;

/// The library-search path variable, read and scoped per launch.
/// 库搜索路径变量，每次启动时读取并作用域化。
pub const LIB_ENV_VAR: &str = "TAPRUN_LIB";

/// Interpreter options forwarded verbatim when isolation mode is active.
/// 隔离模式激活时被原样转发的解释器选项。
pub const OPTIONS_ENV_VAR: &str = "TAPRUN_OPTIONS";

/// Overrides the interpreter executable used to run test programs.
/// 覆盖用于运行测试程序的解释器可执行文件。
pub const INTERPRETER_ENV_VAR: &str = "TAPRUN_INTERPRETER";

/// Separator between entries of a path-list environment value.
/// 路径列表环境值中各条目之间的分隔符。
pub const PATH_LIST_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// A setup/teardown pair scoping one environment variable for the duration of
/// a subprocess. Teardown restores the exact prior value, or removes the
/// variable if it had none, and runs at most once even when invoked both
/// explicitly and through `Drop`.
///
/// 为子进程存续期间作用域化单个环境变量的 setup/teardown 对。
/// teardown 恢复之前的确切值，若之前不存在则移除该变量；
/// 即使显式调用和 `Drop` 都发生，也最多执行一次。
#[derive(Debug)]
pub struct EnvScope {
    var: String,
    value: Option<String>,
    saved: Option<Option<String>>,
    restored: bool,
}

impl EnvScope {
    /// A scope exporting `value` under `var`. `None` builds a scope that
    /// mutates nothing, for launches with no collected library directories.
    ///
    /// 在 `var` 下导出 `value` 的作用域。`None` 构造一个不做任何修改的
    /// 作用域，用于没有收集到库目录的启动。
    pub fn new(var: impl Into<String>, value: Option<String>) -> Self {
        Self {
            var: var.into(),
            value,
            saved: None,
            restored: false,
        }
    }

    /// The value this scope exports, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The explicit environment entries a child spawned under this scope
    /// should receive. Using this instead of `apply` keeps concurrent
    /// launches from interleaving global mutations.
    ///
    /// 在此作用域下派生的子进程应接收的显式环境条目。
    /// 使用它而非 `apply` 可避免并发启动交错全局修改。
    pub fn child_env(&self) -> Vec<(String, String)> {
        match &self.value {
            Some(value) => vec![(self.var.clone(), value.clone())],
            None => Vec::new(),
        }
    }

    /// Writes the scoped value into the process environment, remembering the
    /// previous value. Idempotent: a second call does nothing.
    ///
    /// 将作用域值写入进程环境，并记住之前的值。幂等：再次调用无效果。
    pub fn apply(&mut self) {
        if self.restored || self.saved.is_some() {
            return;
        }
        let Some(value) = &self.value else {
            return;
        };
        self.saved = Some(env::var(&self.var).ok());
        // Callers serialize launches around apply/restore; the child-env map
        // is the concurrency-safe path.
        // 调用方围绕 apply/restore 串行化启动；child_env 映射才是并发安全路径。
        unsafe { env::set_var(&self.var, value) };
    }

    /// Restores the previous value verbatim, or removes the variable if it
    /// was previously absent. Idempotent; also invoked from `Drop`.
    ///
    /// 原样恢复之前的值，若之前不存在则移除该变量。幂等；`Drop` 也会调用。
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        if let Some(saved) = self.saved.take() {
            match saved {
                Some(previous) => unsafe { env::set_var(&self.var, &previous) },
                None => unsafe { env::remove_var(&self.var) },
            }
        }
        self.restored = true;
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        self.restore();
    }
}

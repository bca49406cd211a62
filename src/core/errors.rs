//! # Error Types Module / 错误类型模块
//!
//! Typed failures raised by the invocation layer. Every variant represents
//! caller or environment misconfiguration, raised synchronously and never
//! retried. Subprocess failures are not modelled here; they surface through
//! the execution step unchanged.
//!
//! 调用层抛出的类型化错误。每个变体都代表调用方或环境的配置错误，
//! 同步抛出且从不重试。子进程失败不在此建模，它们会原样通过执行步骤向上传递。

use std::fmt;
use std::path::PathBuf;

/// The error taxonomy of the invocation layer.
/// 调用层的错误分类。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// Contradictory or malformed run options, e.g. two reordering policies
    /// requested at once.
    /// 互相矛盾或格式错误的运行选项，例如同时要求两种重排策略。
    Configuration(String),
    /// A test program path does not reference an existing file at
    /// command-build time.
    /// 构建命令时，测试程序路径指向的文件不存在。
    SourceNotFound(PathBuf),
    /// Interpreter resolution yielded no usable executable path.
    /// 解释器解析未能得到可用的可执行文件路径。
    NoCommand,
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerError::Configuration(msg) => write!(f, "invalid run options: {}", msg),
            RunnerError::SourceNotFound(path) => {
                write!(f, "test program not found: {}", path.display())
            }
            RunnerError::NoCommand => write!(f, "no usable interpreter executable resolved"),
        }
    }
}

impl std::error::Error for RunnerError {}

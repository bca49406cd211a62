//! # Reporting Module / 报告模块
//!
//! This module holds the formatter capability contract and the built-in
//! console formatter pair (plain and color-capable) that consume per-program
//! results and the run summary.
//!
//! 此模块持有 formatter 能力契约，以及消费每程序结果和运行摘要的
//! 内建控制台 formatter 对（普通与支持颜色两种变体）。

pub mod console;

// Re-export common reporting types
pub use console::{ConsoleFormatter, Formatter};

//! # Commands Module / 命令模块
//!
//! Top-level command implementations dispatched from the CLI.
//! 由 CLI 分发的顶层命令实现。

pub mod run;

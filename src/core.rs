//! # Core Module / 核心模块
//!
//! This module contains the core functionality of taprun: the run-options
//! record, the invocation planner, per-test command construction, and the
//! default execution flow.
//!
//! 此模块包含 taprun 的核心功能：运行选项记录、调用计划器、
//! 每个测试的命令构建，以及默认执行流程。

pub mod config;
pub mod env;
pub mod errors;
pub mod execution;
pub mod invocation;
pub mod models;
pub mod planner;
pub mod shebang;

// Re-exports
pub use errors::RunnerError;
pub use invocation::CommandBuilder;
pub use models::{Command, InvocationArguments, TestProgram};
pub use planner::plan_invocation;

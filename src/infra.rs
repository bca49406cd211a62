//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for taprun,
//! including the subprocess spawn primitive and i18n support.
//!
//! 此模块为 taprun 提供基础设施服务，
//! 包括子进程派生原语和国际化支持。

pub mod command;

// Re-export i18n functions for easier access
pub use rust_i18n::t;

//! # Taprun Library / Taprun 库
//!
//! This library provides the core functionality for the taprun tool,
//! the invocation layer of a test runner for TAP-producing test scripts.
//!
//! 此库为 taprun 工具提供核心功能，
//! 它是面向产生 TAP 输出的测试脚本的测试运行器调用层。
//!
//! ## Modules / 模块
//!
//! - `core` - Run options, invocation planning and per-test command construction
//! - `infra` - Infrastructure services like the subprocess spawn primitive
//! - `reporting` - Formatter contract and console formatters
//! - `cli` - Command-line interface
//! - `commands` - Top-level command implementations
//!
//! - `core` - 运行选项、调用计划与每个测试的命令构建
//! - `infra` - 基础设施服务，如子进程派生原语
//! - `reporting` - formatter 契约与控制台 formatter
//! - `cli` - 命令行接口
//! - `commands` - 顶层命令实现

pub mod cli;
pub mod commands;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::models;
pub use crate::core::planner;

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for the application's user interface. It attempts to match the full
/// locale (e.g., "zh-CN"), then just the language code (e.g., "en"), and
/// finally falls back to the default language ("en").
pub fn init() {
    // Detect system locale and set it for i18n.
    // Fallback to "en" if detection fails.
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    // Try to match the full locale first (e.g., "zh-CN")
    // Then try to match the language part only (e.g., "en" from "en-US")
    // Finally, fall back to "en"
    let lang = if available_locales.contains(&locale.as_str()) {
        &locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");

//! # Run Options Module / 运行选项模块
//!
//! The declarative record of run options the front end produces, plus the
//! optional `TapRun.toml` defaults file that deserializes into the same
//! record. Every field is optional; an unset field means "use the default"
//! and must not appear in the derived argument table.
//!
//! 前端产生的声明式运行选项记录，以及可反序列化为同一记录的可选
//! `TapRun.toml` 默认值文件。每个字段都是可选的；未设置的字段表示
//! "使用默认值"，且不得出现在派生的参数表中。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One field per recognized run option. Constructed once from CLI flags
/// (optionally folded over file defaults) and immutable thereafter.
///
/// 每个可识别的运行选项对应一个字段。由 CLI 标志构造一次
/// （可选地叠加文件默认值），此后不可变。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// The test program identifiers, in the order given. Comes from the
    /// command line only, never from the defaults file.
    /// 测试程序标识符，按给定顺序。只来自命令行，从不来自默认值文件。
    #[serde(skip)]
    pub argv: Vec<String>,
    /// Hand the run over to an archiving collaborator.
    /// 将本次运行交给归档协作方。
    pub archive: Option<bool>,
    /// Search `blib/lib` for importable modules.
    /// 在 `blib/lib` 中搜索可导入模块。
    pub blib: Option<bool>,
    /// Select the color-capable formatter variant instead of the plain one.
    /// 选择支持颜色的 formatter 变体而非普通变体。
    pub color: Option<bool>,
    /// Show TODO/SKIP directive lines in the output.
    /// 在输出中显示 TODO/SKIP 指令行。
    pub directives: Option<bool>,
    /// Interpreter override; wrapped as a single-element list when derived.
    /// 解释器覆盖；派生时包装为单元素列表。
    pub exec: Option<String>,
    /// Show failed tests only.
    /// 只显示失败的测试。
    pub failures: Option<bool>,
    /// Formatter selector naming a built-in.
    /// 指名内建实现的 formatter 选择器。
    pub formatter: Option<String>,
    /// Harness selector naming a built-in.
    /// 指名内建实现的 harness 选择器。
    pub harness: Option<String>,
    /// Extra library search directories, in the order given.
    /// 额外的库搜索目录，按给定顺序。
    pub includes: Vec<String>,
    /// Search `lib` for importable modules.
    /// 在 `lib` 中搜索可导入模块。
    pub lib: Option<bool>,
    /// Merge each child's stderr into its TAP stream.
    /// 将每个子进程的 stderr 合并进其 TAP 流。
    pub merge: Option<bool>,
    /// Surface parse errors; derived under the primitive's `errors` key.
    /// 暴露解析错误；派生到原语的 `errors` 键下。
    pub parse: Option<bool>,
    pub quiet: Option<bool>,
    pub really_quiet: Option<bool>,
    /// Recurse into directories during discovery (consumed by the external
    /// discovery collaborator).
    /// 发现阶段递归进入目录（由外部发现协作方消费）。
    pub recurse: Option<bool>,
    /// Run the programs in reverse order.
    /// 逆序运行程序。
    pub reverse: Option<bool>,
    /// Run the programs in random order.
    /// 随机顺序运行程序。
    pub shuffle: Option<bool>,
    /// Fail-level taint isolation, set programmatically.
    /// 失败级别的 taint 隔离，以编程方式设置。
    pub taint_fail: Option<bool>,
    /// Warn-level taint isolation, set programmatically.
    /// 警告级别的 taint 隔离，以编程方式设置。
    pub taint_warn: Option<bool>,
    pub verbose: Option<bool>,
    /// Fail-level warnings mode, set programmatically.
    /// 失败级别的警告模式，以编程方式设置。
    pub warnings_fail: Option<bool>,
    /// Warn-level warnings mode, set programmatically.
    /// 警告级别的警告模式，以编程方式设置。
    pub warnings_warn: Option<bool>,
}

impl RunOptions {
    /// Folds file defaults under the values already present: a field set on
    /// `self` (the CLI side) always wins, an unset field takes the default.
    /// `argv` is never merged.
    ///
    /// 将文件默认值叠加在已有值之下：`self`（CLI 侧）已设置的字段总是
    /// 优先，未设置的字段采用默认值。`argv` 从不合并。
    pub fn merge_defaults(&mut self, defaults: &RunOptions) {
        macro_rules! take_default {
            ($field:ident) => {
                if self.$field.is_none() {
                    self.$field = defaults.$field.clone();
                }
            };
        }
        take_default!(archive);
        take_default!(blib);
        take_default!(color);
        take_default!(directives);
        take_default!(exec);
        take_default!(failures);
        take_default!(formatter);
        take_default!(harness);
        take_default!(lib);
        take_default!(merge);
        take_default!(parse);
        take_default!(quiet);
        take_default!(really_quiet);
        take_default!(recurse);
        take_default!(reverse);
        take_default!(shuffle);
        take_default!(taint_fail);
        take_default!(taint_warn);
        take_default!(verbose);
        take_default!(warnings_fail);
        take_default!(warnings_warn);
        if self.includes.is_empty() {
            self.includes = defaults.includes.clone();
        }
    }
}

/// The shape of the optional defaults file.
/// 可选默认值文件的结构。
#[derive(Debug, Deserialize, Serialize)]
pub struct RunDefaults {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// Defaults to "en" if not specified.
    ///
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    /// 如果未指定，则默认为 "en"。
    #[serde(default = "default_language")]
    pub language: String,

    /// Default run options, overridden field-by-field by the command line.
    /// 默认运行选项，被命令行逐字段覆盖。
    #[serde(default)]
    pub options: RunOptions,
}

fn default_language() -> String {
    "en".to_string()
}

/// Loads the defaults file if it exists. A missing file is not an error; a
/// present but unreadable or malformed file is.
///
/// 如果默认值文件存在则加载。文件缺失不是错误；
/// 文件存在但不可读或格式错误则是。
pub fn load_defaults(path: &Path) -> Result<Option<RunDefaults>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read defaults file: {}", path.display()))?;
    let defaults: RunDefaults = toml::from_str(&content)
        .with_context(|| format!("Failed to parse defaults file: {}", path.display()))?;
    Ok(Some(defaults))
}

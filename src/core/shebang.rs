//! # Shebang Cache Module / Shebang 缓存模块
//!
//! A memoized lookup of a file's first line, used to detect an interpreter
//! directive and any isolation flag it declares. The cache is an explicit
//! object constructed once per run and shared behind an `Arc`, so command
//! building stays free of hidden global state and is trivially testable.
//!
//! 对文件首行的带记忆查找，用于检测解释器指令及其声明的隔离标志。
//! 缓存是每次运行构造一次的显式对象，通过 `Arc` 共享，
//! 因此命令构建不含隐藏的全局状态，且易于单独测试。

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Process-lifetime, append-only cache of first lines. Files are assumed
/// immutable for the duration of a run, so entries are never invalidated.
/// Unreadable files are cached as absent to avoid repeated failed reads.
///
/// 进程生命周期内只增不减的首行缓存。运行期间文件被视为不可变，
/// 因此条目从不失效。不可读的文件被缓存为"缺失"，以避免反复的失败读取。
#[derive(Debug, Default)]
pub struct ShebangCache {
    entries: Mutex<HashMap<PathBuf, Option<String>>>,
}

impl ShebangCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the first line of `path`, reading and memoizing it on first
    /// access. `None` means the file had no readable first line.
    ///
    /// 返回 `path` 的首行，首次访问时读取并记忆。
    /// `None` 表示该文件没有可读的首行。
    pub fn first_line(&self, path: &Path) -> Option<String> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            // The cache is append-only, so a poisoned lock still holds
            // consistent data.
            // 缓存只增不减，因此锁中毒时数据仍然一致。
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(cached) = entries.get(path) {
            return cached.clone();
        }

        let line = read_first_line(path);
        entries.insert(path.to_path_buf(), line.clone());
        line
    }

    /// The number of memoized entries, readable or not.
    /// 已记忆的条目数量，无论可读与否。
    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_first_line(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

// Shared test helpers for integration tests
use lazy_static::lazy_static;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

lazy_static! {
    /// Tests that read or mutate real process environment variables must
    /// hold this lock so they cannot observe each other's values.
    ///
    /// 读取或修改真实进程环境变量的测试必须持有此锁，
    /// 以免观察到彼此的值。
    pub static ref ENV_LOCK: Mutex<()> = Mutex::new(());
}

pub fn env_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writes a test-program script whose first line is `first_line`.
pub fn write_script(dir: &TempDir, name: &str, first_line: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    let content = format!("{}\n{}", first_line, body);
    fs::write(&path, content).expect("Failed to write script fixture");
    path
}

/// Writes a defaults file with the given TOML content.
pub fn write_defaults(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("TapRun.toml");
    fs::write(&path, content).expect("Failed to write defaults fixture");
    path
}

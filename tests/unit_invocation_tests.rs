//! # Invocation Module Unit Tests / Invocation 模块单元测试
//!
//! This module contains unit tests for the `invocation.rs` module: switch
//! composition and quoting, shebang-declared isolation, include-path
//! collection, environment scoping, and the error taxonomy.
//!
//! 此模块包含 `invocation.rs` 模块的单元测试：开关组合与引号处理、
//! shebang 声明的隔离、包含路径收集、环境作用域以及错误分类。

mod common;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

use taprun::core::env::{EnvScope, LIB_ENV_VAR, OPTIONS_ENV_VAR, PATH_LIST_SEPARATOR};
use taprun::core::errors::RunnerError;
use taprun::core::invocation::{CommandBuilder, ExecutableResolver, quote_switch};
use taprun::core::models::TestProgram;
use taprun::core::shebang::ShebangCache;

/// A resolver pinned to a fixed interpreter path, so tests do not depend on
/// the environment or the test binary's own location.
///
/// 固定解释器路径的解析器，使测试不依赖环境或测试二进制自身的位置。
struct FixedResolver(&'static str);

impl ExecutableResolver for FixedResolver {
    fn resolve(&self, _program: &TestProgram) -> Result<String, RunnerError> {
        Ok(self.0.to_string())
    }
}

/// A resolver that never finds an interpreter.
struct NoResolver;

impl ExecutableResolver for NoResolver {
    fn resolve(&self, _program: &TestProgram) -> Result<String, RunnerError> {
        Err(RunnerError::NoCommand)
    }
}

fn builder() -> CommandBuilder {
    CommandBuilder::new(Arc::new(ShebangCache::new()))
        .with_resolver(Box::new(FixedResolver("/opt/tapscript/bin/tapscript")))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod quoting_tests {
    use super::*;

    #[test]
    fn test_switch_with_whitespace_gets_one_layer_of_quotes() {
        assert_eq!(quote_switch("-Imy lib"), "\"-Imy lib\"");
    }

    #[test]
    fn test_fully_quoted_switch_is_left_unchanged() {
        assert_eq!(quote_switch("\"-Imy lib\""), "\"-Imy lib\"");
    }

    #[test]
    fn test_switch_without_whitespace_is_left_unquoted() {
        assert_eq!(quote_switch("-Ilib"), "-Ilib");
        assert_eq!(quote_switch("-T"), "-T");
    }
}

#[cfg(test)]
mod command_build_tests {
    use super::*;

    #[test]
    fn test_explicit_switch_letters_become_flags() {
        let _guard = common::env_guard();
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "basic.t", "# no shebang", "");

        let (command, _scope) = builder()
            .build(&TestProgram::new(script.to_str().unwrap()), &strings(&["T"]))
            .unwrap();

        // 参数表携带裸字母；组合后的命令行携带标志形式。
        assert!(command.switches.contains(&"-T".to_string()));
    }

    #[test]
    fn test_each_mode_letter_maps_to_its_flag() {
        let _guard = common::env_guard();
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "letters.t", "# plain", "");
        let program = TestProgram::new(script.to_str().unwrap());

        for (letter, flag) in [("T", "-T"), ("t", "-t"), ("W", "-W"), ("w", "-w")] {
            let (command, _scope) = builder().build(&program, &strings(&[letter])).unwrap();
            assert_eq!(command.switches, vec![flag.to_string()]);
        }

        let (command, _scope) = builder().build(&program, &[]).unwrap();
        assert!(command.switches.is_empty());
    }

    #[test]
    fn test_shebang_isolation_flag_is_propagated_without_explicit_switches() {
        let _guard = common::env_guard();
        let dir = tempdir().unwrap();
        let script = common::write_script(
            &dir,
            "tainted.t",
            "#!/usr/bin/env tapscript -wT",
            "print result\n",
        );

        let (command, _scope) = builder()
            .build(&TestProgram::new(script.to_str().unwrap()), &[])
            .unwrap();

        assert!(command.switches.contains(&"-T".to_string()));
    }

    #[test]
    fn test_shebang_warn_level_isolation_uses_lowercase_flag() {
        let _guard = common::env_guard();
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "warn.t", "#!/usr/bin/tapscript -t", "");

        let (command, _scope) = builder()
            .build(&TestProgram::new(script.to_str().unwrap()), &[])
            .unwrap();

        assert!(command.switches.contains(&"-t".to_string()));
        assert!(!command.switches.contains(&"-T".to_string()));
    }

    #[test]
    fn test_first_isolation_letter_in_cluster_wins() {
        let _guard = common::env_guard();
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "both.t", "#!/usr/bin/tapscript -tT", "");

        let (command, _scope) = builder()
            .build(&TestProgram::new(script.to_str().unwrap()), &[])
            .unwrap();

        // 簇中的第一个隔离字母胜出，并且只附加一个开关。
        assert!(command.switches.contains(&"-t".to_string()));
        assert!(!command.switches.contains(&"-T".to_string()));
    }

    #[test]
    fn test_plain_shebang_declares_no_isolation() {
        let _guard = common::env_guard();
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "plain.t", "#!/bin/sh -e", "");

        let (command, _scope) = builder()
            .build(&TestProgram::new(script.to_str().unwrap()), &[])
            .unwrap();

        assert!(command.switches.is_empty());
    }

    #[test]
    fn test_command_assembles_executable_switches_path_and_args() {
        let _guard = common::env_guard();
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "order.t", "# plain", "");
        let path = script.to_str().unwrap().to_string();
        let program = TestProgram::with_args(path.clone(), strings(&["--case", "seven"]));

        let (command, _scope) = builder().build(&program, &strings(&["w"])).unwrap();

        assert_eq!(
            command.argv(),
            vec![
                "/opt/tapscript/bin/tapscript".to_string(),
                "-w".to_string(),
                path.clone(),
                "--case".to_string(),
                "seven".to_string(),
            ]
        );
        assert_eq!(command.program_path, path);
    }

    #[test]
    fn test_exec_override_leads_the_command() {
        let _guard = common::env_guard();
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "exec.t", "# plain", "");

        let builder = CommandBuilder::new(Arc::new(ShebangCache::new()))
            .with_exec_override(Some(strings(&["other-interp --check"])));
        let (command, _scope) = builder
            .build(&TestProgram::new(script.to_str().unwrap()), &[])
            .unwrap();

        // 覆盖命令的第一个词成为可执行文件，其余词在开关列表之前。
        assert_eq!(command.executable, "other-interp");
        assert_eq!(command.switches.first().map(String::as_str), Some("--check"));
    }

    #[test]
    fn test_missing_source_is_a_source_not_found_error() {
        let result = builder().build(&TestProgram::new("does/not/exist.t"), &[]);

        assert_eq!(
            result.err(),
            Some(RunnerError::SourceNotFound(PathBuf::from("does/not/exist.t")))
        );
    }

    #[test]
    fn test_unresolvable_interpreter_is_a_no_command_error() {
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "nocmd.t", "# plain", "");

        let builder =
            CommandBuilder::new(Arc::new(ShebangCache::new())).with_resolver(Box::new(NoResolver));
        let result = builder.build(&TestProgram::new(script.to_str().unwrap()), &[]);

        assert_eq!(result.err(), Some(RunnerError::NoCommand));
    }

    #[test]
    fn test_empty_exec_override_is_a_no_command_error() {
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "emptyexec.t", "# plain", "");

        let builder = CommandBuilder::new(Arc::new(ShebangCache::new()))
            .with_exec_override(Some(strings(&[""])));
        let result = builder.build(&TestProgram::new(script.to_str().unwrap()), &[]);

        assert_eq!(result.err(), Some(RunnerError::NoCommand));
    }
}

#[cfg(test)]
mod environment_tests {
    use super::*;

    #[test]
    fn test_include_switches_feed_the_library_scope() {
        let _guard = common::env_guard();
        unsafe { env::remove_var(LIB_ENV_VAR) };
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "libs.t", "# plain", "");

        let (_command, scope) = builder()
            .build(
                &TestProgram::new(script.to_str().unwrap()),
                &strings(&["-Ifour", "-Ifive"]),
            )
            .unwrap();

        let expected = format!("four{}five", PATH_LIST_SEPARATOR);
        assert_eq!(scope.value(), Some(expected.as_str()));
        assert_eq!(
            scope.child_env(),
            vec![(LIB_ENV_VAR.to_string(), expected.clone())]
        );
    }

    #[test]
    fn test_prejoined_include_values_are_not_collected() {
        let _guard = common::env_guard();
        unsafe { env::remove_var(LIB_ENV_VAR) };
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "joined.t", "# plain", "");

        let prejoined = format!("-Ione{}two", PATH_LIST_SEPARATOR);
        let (_command, scope) = builder()
            .build(&TestProgram::new(script.to_str().unwrap()), &[prejoined])
            .unwrap();

        // 已拼接的值不是单个目录，予以跳过。
        assert_eq!(scope.value(), None);
        assert!(scope.child_env().is_empty());
    }

    #[test]
    fn test_existing_search_path_entries_are_appended() {
        let _guard = common::env_guard();
        let sep = PATH_LIST_SEPARATOR.to_string();
        unsafe { env::set_var(LIB_ENV_VAR, format!("pre1{}pre2", sep)) };
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "merge.t", "# plain", "");

        let (_command, scope) = builder()
            .build(
                &TestProgram::new(script.to_str().unwrap()),
                &strings(&["-Inew"]),
            )
            .unwrap();

        let expected = format!("new{}pre1{}pre2", sep, sep);
        assert_eq!(scope.value(), Some(expected.as_str()));
        unsafe { env::remove_var(LIB_ENV_VAR) };
    }

    #[test]
    fn test_isolation_rederives_search_path_as_switches() {
        let _guard = common::env_guard();
        let sep = PATH_LIST_SEPARATOR.to_string();
        unsafe { env::set_var(LIB_ENV_VAR, "inherited") };
        unsafe { env::set_var(OPTIONS_ENV_VAR, "-Mpragma") };
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "isolated.t", "#!/usr/bin/tapscript -T", "");

        let (command, scope) = builder()
            .build(
                &TestProgram::new(script.to_str().unwrap()),
                &strings(&["-Ifour"]),
            )
            .unwrap();

        // 隔离的解释器不信任环境：-I 开关被重新下发，选项被原样转发。
        assert!(command.switches.contains(&"-T".to_string()));
        assert!(command.switches.contains(&"-Ifour".to_string()));
        assert!(command.switches.contains(&"-Iinherited".to_string()));
        assert_eq!(command.switches.last().map(String::as_str), Some("-Mpragma"));
        let expected = format!("four{}inherited", sep);
        assert_eq!(scope.value(), Some(expected.as_str()));

        unsafe { env::remove_var(LIB_ENV_VAR) };
        unsafe { env::remove_var(OPTIONS_ENV_VAR) };
    }

    #[test]
    fn test_scope_roundtrip_restores_previous_value() {
        let _guard = common::env_guard();
        unsafe { env::set_var(LIB_ENV_VAR, "before") };
        let captured = env::var(LIB_ENV_VAR).ok();

        let mut scope = EnvScope::new(LIB_ENV_VAR, Some("during".to_string()));
        scope.apply();
        assert_eq!(env::var(LIB_ENV_VAR).ok().as_deref(), Some("during"));
        scope.restore();

        assert_eq!(env::var(LIB_ENV_VAR).ok(), captured);
        unsafe { env::remove_var(LIB_ENV_VAR) };
    }

    #[test]
    fn test_scope_roundtrip_removes_previously_absent_variable() {
        let _guard = common::env_guard();
        unsafe { env::remove_var(LIB_ENV_VAR) };

        let mut scope = EnvScope::new(LIB_ENV_VAR, Some("during".to_string()));
        scope.apply();
        assert_eq!(env::var(LIB_ENV_VAR).ok().as_deref(), Some("during"));
        scope.restore();

        // 之前不存在的变量必须被整体移除，而不是留下空值。
        assert!(env::var(LIB_ENV_VAR).is_err());
    }

    #[test]
    fn test_scope_apply_and_restore_are_idempotent() {
        let _guard = common::env_guard();
        unsafe { env::set_var(LIB_ENV_VAR, "original") };

        let mut scope = EnvScope::new(LIB_ENV_VAR, Some("scoped".to_string()));
        scope.apply();
        scope.apply();
        scope.restore();
        scope.restore();

        assert_eq!(env::var(LIB_ENV_VAR).ok().as_deref(), Some("original"));
        unsafe { env::remove_var(LIB_ENV_VAR) };
    }

    #[test]
    fn test_scope_drop_releases_the_mutation() {
        let _guard = common::env_guard();
        unsafe { env::set_var(LIB_ENV_VAR, "kept") };

        {
            let mut scope = EnvScope::new(LIB_ENV_VAR, Some("temporary".to_string()));
            scope.apply();
            assert_eq!(env::var(LIB_ENV_VAR).ok().as_deref(), Some("temporary"));
            // scope 在此离开作用域。
        }

        assert_eq!(env::var(LIB_ENV_VAR).ok().as_deref(), Some("kept"));
        unsafe { env::remove_var(LIB_ENV_VAR) };
    }

    #[test]
    fn test_switch_with_whitespace_is_quoted_in_the_command() {
        let _guard = common::env_guard();
        unsafe { env::remove_var(LIB_ENV_VAR) };
        let dir = tempdir().unwrap();
        let script = common::write_script(&dir, "quoted.t", "# plain", "");

        let (command, scope) = builder()
            .build(
                &TestProgram::new(script.to_str().unwrap()),
                &strings(&["-Imy lib"]),
            )
            .unwrap();

        assert!(command.switches.contains(&"\"-Imy lib\"".to_string()));
        // 引号只影响命令行形式；作用域值保留原始路径。
        assert_eq!(scope.value(), Some("my lib"));
    }
}

// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::{commands, core::config::RunOptions, infra::t};

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language() -> String {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        if let Some(lang) = args.get(pos + 1) {
            return lang.clone();
        }
    }
    // Fallback to system language detection
    sys_locale::get_locale().unwrap_or_else(|| "en".to_string())
}

fn build_cli(locale: &str) -> Command {
    Command::new("taprun")
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("programs")
                .help(t!("arg_programs", locale = locale).to_string())
                .value_name("PROGRAMS")
                .num_args(1..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help(t!("arg_verbose", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("failures")
                .short('f')
                .long("failures")
                .help(t!("arg_failures", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("lib")
                .short('l')
                .long("lib")
                .help(t!("arg_lib", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("blib")
                .short('b')
                .long("blib")
                .help(t!("arg_blib", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("shuffle")
                .short('s')
                .long("shuffle")
                .help(t!("arg_shuffle", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("color")
                .short('c')
                .long("color")
                .help(t!("arg_color", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("recurse")
                .short('r')
                .long("recurse")
                .help(t!("arg_recurse", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("reverse")
                .long("reverse")
                .help(t!("arg_reverse", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("parse")
                .short('p')
                .long("parse")
                .help(t!("arg_parse", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help(t!("arg_quiet", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("really-quiet")
                .short('Q')
                .long("QUIET")
                .help(t!("arg_really_quiet", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("merge")
                .short('m')
                .long("merge")
                .help(t!("arg_merge", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("directives")
                .long("directives")
                .help(t!("arg_directives", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("archive")
                .short('a')
                .long("archive")
                .help(t!("arg_archive", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("include")
                .short('I')
                .long("include")
                .help(t!("arg_include", locale = locale).to_string())
                .value_name("DIR")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("exec")
                .long("exec")
                .help(t!("arg_exec", locale = locale).to_string())
                .value_name("COMMAND")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("formatter")
                .long("formatter")
                .help(t!("arg_formatter", locale = locale).to_string())
                .value_name("NAME")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("harness")
                .long("harness")
                .help(t!("arg_harness", locale = locale).to_string())
                .value_name("NAME")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help(t!("arg_jobs", locale = locale).to_string())
                .value_name("JOBS")
                .value_parser(clap::value_parser!(usize))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help(t!("arg_config", locale = locale).to_string())
                .value_name("CONFIG")
                .default_value("TapRun.toml")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
}

/// Maps parsed flags onto the run-options record. A flag left at its default
/// stays unset so it never reaches the derived argument table.
/// 将解析后的标志映射到运行选项记录。保持默认的标志视为未设置，
/// 因此绝不会进入派生的参数表。
fn options_from_matches(matches: &ArgMatches) -> RunOptions {
    fn flag(matches: &ArgMatches, id: &str) -> Option<bool> {
        if matches.get_flag(id) { Some(true) } else { None }
    }

    RunOptions {
        argv: matches
            .get_many::<String>("programs")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        archive: flag(matches, "archive"),
        blib: flag(matches, "blib"),
        color: flag(matches, "color"),
        directives: flag(matches, "directives"),
        exec: matches.get_one::<String>("exec").cloned(),
        failures: flag(matches, "failures"),
        formatter: matches.get_one::<String>("formatter").cloned(),
        harness: matches.get_one::<String>("harness").cloned(),
        includes: matches
            .get_many::<String>("include")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        lib: flag(matches, "lib"),
        merge: flag(matches, "merge"),
        parse: flag(matches, "parse"),
        quiet: flag(matches, "quiet"),
        really_quiet: flag(matches, "really-quiet"),
        recurse: flag(matches, "recurse"),
        reverse: flag(matches, "reverse"),
        shuffle: flag(matches, "shuffle"),
        verbose: flag(matches, "verbose"),
        // The isolation and warnings modes are programmatic options, set via
        // the defaults file rather than documented CLI switches.
        // 隔离与警告模式是编程式选项，通过默认值文件而非文档化的 CLI 开关设置。
        ..RunOptions::default()
    }
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let language = pre_parse_language();
    rust_i18n::set_locale(&language);

    let matches = build_cli(&language).get_matches();

    let options = options_from_matches(&matches);
    let jobs = matches.get_one::<usize>("jobs").copied();
    let config = matches
        .get_one::<PathBuf>("config")
        .unwrap() // Has default
        .clone();

    commands::run::execute(options, jobs, config).await
}

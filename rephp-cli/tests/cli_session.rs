//! The front end driven the way a user would drive it.

use std::io::Write;

use rephp_cleaner::{CleanerOptions, CodeCleaner};
use rephp_cli::clean::cmd_clean;
use rephp_cli::config::load_config;
use rephp_cli::error::CliError;
use rephp_cli::repl::{Session, Step};

fn code(step: Step) -> String {
    match step {
        Step::Code(code) => code,
        other => panic!("expected code, got {other:?}"),
    }
}

#[test]
fn scripted_session() {
    let mut session = Session::new(CodeCleaner::new(CleanerOptions::default()));
    code(session.feed("namespace Foo;"));
    code(session.feed("use StdClass as S;"));
    let cleaned = code(session.feed("$x = new S();"));
    assert!(cleaned.contains("new \\StdClass()"), "{cleaned}");

    code(session.feed("class Greeter {}"));
    let Step::Error(err) = session.feed("class Greeter {}") else {
        panic!("redeclaration must fail");
    };
    assert_eq!(err.message(), "Class named Foo\\Greeter already exists");
    assert_eq!(session.feed(":ns"), Step::Output("Foo\n".to_string()));
}

#[test]
fn config_file_drives_the_cleaner() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "strict_types = true\nyolo = true").unwrap();
    let config = load_config(Some(file.path()));
    assert!(config.strict_types && config.yolo);

    let mut session = Session::new(CodeCleaner::new(config.cleaner_options()));
    let cleaned = code(session.feed("break;"));
    assert!(cleaned.starts_with("declare(strict_types=1);"), "{cleaned}");
}

#[test]
fn malformed_or_missing_config_falls_back() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "strict_types = \"very\"").unwrap();
    assert!(!load_config(Some(file.path())).strict_types);

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(load_config(Some(&missing)).assume_autoload);
}

#[test]
fn clean_command() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "<?php\nuse A\\B as C;\nnew C();").unwrap();

    let mut cleaner = CodeCleaner::new(CleanerOptions::default());
    let out = cmd_clean(&mut cleaner, file.path(), false).unwrap();
    assert!(out.contains("return new \\A\\B();"), "{out}");

    let mut cleaner = CodeCleaner::new(CleanerOptions::default());
    let json = cmd_clean(&mut cleaner, file.path(), true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["status"], "complete");

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.php");
    let mut cleaner = CodeCleaner::new(CleanerOptions::default());
    assert!(matches!(
        cmd_clean(&mut cleaner, &missing, false),
        Err(CliError::Read { .. })
    ));
}

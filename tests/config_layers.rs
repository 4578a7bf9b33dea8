// tests/config_layers.rs
mod common;
use crate::common::{init_tracing, shipped};

use std::error::Error;
use std::io::Write;

use tempfile::TempDir;

use makedag::config::{load_and_validate, load_layers};
use makedag::dag::{TaskInfo, TaskKind};
use makedag::types::TaskKindSpec;

type TestResult = Result<(), Box<dyn Error>>;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::io::Result<std::path::PathBuf> {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

#[test]
fn shipped_task_files_declare_the_full_workflow() -> TestResult {
    init_tracing();

    let cfg = load_and_validate(&[shipped("Makedag.toml")], &[])?;

    let names: Vec<&str> = cfg.task.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![
            "virtualenv",
            "env",
            "env/requirements.built",
            "flake8",
            "test",
            "test_coverage",
            "autopep8",
            "clean",
            "dist",
            "release",
        ]
    );
    assert_eq!(cfg.default_task(), Some("virtualenv"));
    assert_eq!(cfg.task["env/requirements.built"].kind, TaskKindSpec::File);

    Ok(())
}

#[test]
fn release_layer_replaces_earlier_declarations_in_full() -> TestResult {
    init_tracing();

    let cfg = load_and_validate(&[shipped("Makedag.toml")], &[])?;

    let dist = &cfg.task["dist"];
    assert_eq!(dist.deps, vec!["clean".to_string()]);
    assert_eq!(
        dist.cmd.lines(),
        vec![
            "python setup.py sdist --formats=gztar > /dev/null".to_string(),
            "python setup.py bdist_wheel".to_string(),
            "ls -l dist".to_string(),
        ]
    );

    Ok(())
}

#[test]
fn later_layer_does_not_merge_prerequisites_or_recipe() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;

    let base = write_file(
        &dir,
        "base.toml",
        r#"
[task.prepare]
cmd = "echo prepare"

[task.dist]
deps = ["prepare"]
cmd = ["echo one", "echo two"]
"#,
    )?;
    let overlay = write_file(
        &dir,
        "overlay.toml",
        r#"
[task.dist]
cmd = "echo three"
"#,
    )?;

    let cfg = load_and_validate(&[base, overlay], &[])?;

    let dist = &cfg.task["dist"];
    assert!(dist.deps.is_empty());
    assert_eq!(dist.cmd.lines(), vec!["echo three".to_string()]);

    // Redeclared tasks keep their original position.
    let names: Vec<&str> = cfg.task.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["prepare", "dist"]);

    Ok(())
}

#[test]
fn variables_expand_in_lint_and_format_recipes() -> TestResult {
    init_tracing();

    let cfg = load_and_validate(&[shipped("Makedag.toml")], &[])?;

    assert_eq!(
        cfg.task["flake8"].cmd.lines(),
        vec!["flake8 --max-line-length=110 examples *.py".to_string()]
    );
    assert_eq!(
        cfg.task["autopep8"].cmd.lines(),
        vec!["autopep8 --max-line-length=110 -i examples *.py".to_string()]
    );

    Ok(())
}

#[test]
fn command_line_defines_override_vars() -> TestResult {
    init_tracing();

    let defines = vec![("MAX_LINE_LENGTH".to_string(), "79".to_string())];
    let cfg = load_and_validate(&[shipped("Makedag.toml")], &defines)?;

    assert_eq!(
        cfg.task["flake8"].cmd.lines(),
        vec!["flake8 --max-line-length=79 examples *.py".to_string()]
    );

    Ok(())
}

#[test]
fn dollar_escapes_and_shell_variables_pass_through() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;

    let path = write_file(
        &dir,
        "Makedag.toml",
        r#"
[vars]
NAME = "world"

[task.greet]
cmd = "echo ${NAME} $$HOME $HOME"
"#,
    )?;

    let cfg = load_and_validate(&[path], &[])?;
    assert_eq!(
        cfg.task["greet"].cmd.lines(),
        vec!["echo world $HOME $HOME".to_string()]
    );

    Ok(())
}

#[test]
fn brace_reference_falls_back_to_the_environment() -> TestResult {
    init_tracing();
    let Ok(search_path) = std::env::var("PATH") else {
        return Ok(());
    };
    let dir = TempDir::new()?;

    let path = write_file(
        &dir,
        "Makedag.toml",
        r#"
[task.which]
cmd = "echo ${PATH} $(PATH)"
"#,
    )?;

    let cfg = load_and_validate(&[path], &[])?;
    assert_eq!(
        cfg.task["which"].cmd.lines(),
        vec![format!("echo {search_path} {search_path}")]
    );

    Ok(())
}

#[test]
fn coverage_run_is_limited_to_the_package() -> TestResult {
    init_tracing();

    let cfg = load_and_validate(&[shipped("Makedag.toml")], &[])?;

    assert_eq!(cfg.task["test"].cmd.lines(), vec!["nosetests -v".to_string()]);
    assert_eq!(
        cfg.task["test_coverage"].cmd.lines(),
        vec!["nosetests -v --with-coverage --cover-package=zeroconf".to_string()]
    );

    Ok(())
}

#[test]
fn leading_dot_slash_names_the_same_target() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;

    let path = write_file(
        &dir,
        "Makedag.toml",
        r#"
[task."./out/marker"]
kind = "file"
deps = ["./input.txt"]
cmd = "touch out/marker"

[task.all]
deps = ["out/marker"]
"#,
    )?;

    let cfg = load_and_validate(&[path], &[])?;
    assert!(cfg.task.contains_key("out/marker"));

    let info = TaskInfo::from_config("out/marker".to_string(), &cfg.task["out/marker"], &cfg);
    match info.kind {
        TaskKind::File { path, inputs } => {
            assert_eq!(path, std::path::PathBuf::from("out/marker"));
            assert_eq!(inputs, vec![std::path::PathBuf::from("input.txt")]);
        }
        TaskKind::Phony => panic!("expected a file task"),
    }

    Ok(())
}

#[test]
fn include_cycles_are_rejected() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;

    write_file(&dir, "a.toml", "include = [\"b.toml\"]\n[task.a]\ncmd = \"true\"\n")?;
    write_file(&dir, "b.toml", "include = [\"a.toml\"]\n[task.b]\ncmd = \"true\"\n")?;

    let result = load_layers(&[dir.path().join("a.toml")]);
    match result {
        Err(e) => assert!(e.to_string().contains("includes itself")),
        Ok(_) => panic!("expected include cycle to be rejected"),
    }

    Ok(())
}

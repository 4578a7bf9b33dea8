// tests/error_handling.rs

use std::io::Write;
use tempfile::NamedTempFile;
use makedag::config::load_and_validate;
use makedag::errors::MakedagError;

fn task_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_dag_cycle_returns_structured_error() {
    let file = task_file(
        r#"
[task.A]
cmd = "echo A"
deps = ["B"]

[task.B]
cmd = "echo B"
deps = ["A"]
"#,
    );

    let result = load_and_validate(&[file.path().to_path_buf()], &[]);

    match result {
        Err(MakedagError::DagCycle(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains("A") || msg.contains("B"));
        }
        Err(e) => panic!("Expected DagCycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let file = task_file(
        r#"
[task.A]
cmd = "echo A"
deps = ["A"]
"#,
    );

    let result = load_and_validate(&[file.path().to_path_buf()], &[]);
    assert!(matches!(result, Err(MakedagError::DagCycle(_))));
}

#[test]
fn test_undefined_variable_is_rejected_at_load_time() {
    let file = task_file(
        r#"
[task.flake8]
cmd = "flake8 --max-line-length=$(MAX_LINE_LENGTH) examples *.py"
"#,
    );

    let result = load_and_validate(&[file.path().to_path_buf()], &[]);

    match result {
        Err(MakedagError::UndefinedVariable { task, name }) => {
            assert_eq!(task, "flake8");
            assert_eq!(name, "MAX_LINE_LENGTH");
        }
        Err(e) => panic!("Expected UndefinedVariable, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_default_task_returns_config_error() {
    let file = task_file(
        r#"
[config]
default_task = "missing"

[task.A]
cmd = "echo A"
"#,
    );

    let result = load_and_validate(&[file.path().to_path_buf()], &[]);

    match result {
        Err(MakedagError::ConfigError(msg)) => assert!(msg.contains("missing")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_empty_task_table_returns_config_error() {
    let file = task_file("[vars]\nX = \"1\"\n");

    let result = load_and_validate(&[file.path().to_path_buf()], &[]);
    assert!(matches!(result, Err(MakedagError::ConfigError(_))));
}

#[test]
fn test_invalid_kind_is_a_toml_error() {
    let file = task_file(
        r#"
[task.A]
kind = "directory"
cmd = "echo A"
"#,
    );

    let result = load_and_validate(&[file.path().to_path_buf()], &[]);
    assert!(matches!(result, Err(MakedagError::TomlError(_))));
}

#[test]
fn test_missing_task_file_returns_config_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = load_and_validate(&[dir.path().join("Makedag.toml")], &[]);

    match result {
        Err(MakedagError::ConfigError(msg)) => assert!(msg.contains("Makedag.toml")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

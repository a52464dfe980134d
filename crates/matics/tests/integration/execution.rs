use matics::config::Language;
use matics::types::ExecutionStage;

use super::{fixture_source, test_runner};

#[tokio::test]
async fn test_hello_world_every_language() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;

    for (language, fixture) in [
        (Language::Python, "hello.py"),
        (Language::Java, "hello.java"),
        (Language::C, "hello.c"),
        (Language::Cpp, "hello.cpp"),
    ] {
        let result = runner
            .execute(&workspace, language, &fixture_source(fixture), "")
            .await
            .unwrap();

        assert_eq!(result.stage, ExecutionStage::Run, "{language}");
        assert_eq!(result.exit_code, Some(0), "{language}: {}", result.stderr);
        assert_eq!(result.stdout, "Hello, World!\n", "{language}");
    }
}

#[tokio::test]
async fn test_default_templates_run() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;

    for language in Language::ALL {
        let result = runner
            .execute(&workspace, language, language.default_source(), "")
            .await
            .unwrap();
        assert!(result.is_success(), "{language}: {}", result.stderr);
        assert_eq!(result.stdout.trim_end(), "Hello, World!", "{language}");
    }
}

#[tokio::test]
async fn test_python_arithmetic() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;

    let result = runner
        .execute(&workspace, Language::Python, "print(1+1)", "")
        .await
        .unwrap();

    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.stdout, "2\n");
    assert_eq!(result.stderr, "");
}

#[tokio::test]
async fn test_c_nonzero_exit_with_no_output() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;

    let result = runner
        .execute(&workspace, Language::C, "int main(){ return 1; }", "")
        .await
        .unwrap();

    assert_eq!(result.stage, ExecutionStage::Run);
    assert_eq!(result.exit_code, Some(1));
    assert!(result.stdout.is_empty());
    assert!(result.stderr.is_empty());
    assert_eq!(result.console_output(), "");
}

#[tokio::test]
async fn test_stdin_is_forwarded() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;

    let result = runner
        .execute(&workspace, Language::Python, &fixture_source("echo_input.py"), "Ada\n")
        .await
        .unwrap();
    assert_eq!(result.stdout, "Hello, Ada!\n");

    let result = runner
        .execute(&workspace, Language::Cpp, &fixture_source("sum_input.cpp"), "40 2")
        .await
        .unwrap();
    assert_eq!(result.stdout, "42\n");
}

#[tokio::test]
async fn test_runtime_error_goes_to_stderr() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;

    let result = runner
        .execute(&workspace, Language::Python, &fixture_source("runtime_error.py"), "")
        .await
        .unwrap();

    assert_eq!(result.stage, ExecutionStage::Run);
    assert_eq!(result.exit_code, Some(1));
    assert!(result.stdout.is_empty());
    assert!(result.stderr.contains("ValueError: boom"));
    assert_eq!(result.console_output(), result.stderr);
}

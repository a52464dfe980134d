use matics::config::{Language, executable_file_name};
use matics::runner::CompileError;
use matics::types::ExecutionStage;

use super::{fixture_source, test_runner};

#[tokio::test]
async fn test_compile_c_success() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;
    workspace
        .write(Language::C, &fixture_source("hello.c"))
        .await
        .unwrap();

    let result = runner.compile(&workspace, Language::C).await.unwrap();

    assert!(result.is_success(), "compile failed: {}", result.output());
    assert!(workspace.file_exists(&executable_file_name("temp_C_program")).await.unwrap());
}

#[tokio::test]
async fn test_compile_java_produces_class() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;
    workspace
        .write(Language::Java, &fixture_source("hello.java"))
        .await
        .unwrap();

    let result = runner.compile(&workspace, Language::Java).await.unwrap();

    assert!(result.is_success(), "compile failed: {}", result.output());
    assert!(workspace.file_exists("Main.class").await.unwrap());
}

#[tokio::test]
async fn test_compile_error_reports_diagnostics() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;

    for (language, fixture) in [
        (Language::C, "compile_error.c"),
        (Language::Cpp, "compile_error.cpp"),
        (Language::Java, "compile_error.java"),
    ] {
        let result = runner
            .execute(&workspace, language, &fixture_source(fixture), "")
            .await
            .unwrap();

        assert_eq!(result.stage, ExecutionStage::Compile, "{language}");
        assert_ne!(result.exit_code, Some(0), "{language}");
        assert!(result.stderr.contains("error"), "{language}: {}", result.stderr);
    }
}

#[tokio::test]
async fn test_stale_binary_is_never_run() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;

    let first = runner
        .execute(&workspace, Language::Cpp, &fixture_source("hello.cpp"), "")
        .await
        .unwrap();
    assert_eq!(first.stdout, "Hello, World!\n");
    assert!(workspace.file_exists(&executable_file_name("temp_cpp_program")).await.unwrap());

    let second = runner
        .execute(&workspace, Language::Cpp, &fixture_source("compile_error.cpp"), "")
        .await
        .unwrap();

    assert!(second.is_compile_failure());
    assert!(!second.stdout.contains("Hello, World!"));
    assert!(!workspace.file_exists(&executable_file_name("temp_cpp_program")).await.unwrap());
}

#[tokio::test]
async fn test_compile_python_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, workspace) = test_runner(tmp.path()).await;
    workspace
        .write(Language::Python, &fixture_source("hello.py"))
        .await
        .unwrap();

    let result = runner.compile(&workspace, Language::Python).await;
    assert!(matches!(result, Err(CompileError::NotCompiled(_))));
}

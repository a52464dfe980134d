use matics::config::{Config, Language, WebFramework};

use super::FIXTURES_PATH;

#[test]
fn test_load_valid_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_full.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert_eq!(config.host, "localhost");
    assert_eq!(config.default_project, "site");
    assert_eq!(config.workspace_dir.to_str(), Some("scratch"));

    let python = config.get_language(Language::Python).unwrap();
    assert_eq!(python.source_name.as_str(), "main.py");
    assert_eq!(python.run.env.len(), 1);

    let c = config.get_language(Language::C).unwrap();
    assert_eq!(c.output_name().as_deref(), Some("main"));

    let django = config.get_framework(WebFramework::Django).unwrap();
    assert!(django.is_scaffolded());
    assert_eq!(django.url(&config.host), "http://localhost:8003");
}

#[test]
fn test_load_minimal_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_minimal.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert!(config.languages.contains_key("python"));
    assert!(config.frameworks.is_empty());
    assert_eq!(config.workspace_dir.to_str(), Some("temp_files"));
}

#[test]
fn test_load_invalid_empty_name() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_empty_name.toml");
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_load_invalid_empty_run_command() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_empty_run_command.toml");
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_load_invalid_source_path() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_source_path.toml");
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_load_invalid_unknown_language() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_unknown_language.toml");
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_load_invalid_duplicate_port() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_duplicate_port.toml");
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_load_missing_file() {
    let path = format!("{FIXTURES_PATH}/configs/does_not_exist.toml");
    assert!(Config::from_file(&path).is_err());
}

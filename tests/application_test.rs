//! 应用启动流程的集成测试

use ignitor::config::{Config, Env};
use ignitor::infrastructure::provider::{CONFIG_ALIAS, ENV_ALIAS, HELPERS_ALIAS, LOGGER_ALIAS};
use ignitor::logger::LoggerManager;
use ignitor::utils::Helpers;
use ignitor::Application;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn scaffold(root: &std::path::Path) {
    fs::create_dir_all(root.join("config")).unwrap();
    fs::write(
        root.join("config/app.toml"),
        r#"
name = "demo"

[logger]
driver = "file"
boot_message = "application ready"

[logger.file]
filename = "boot.log"
level = "debug"
"#,
    )
    .unwrap();
    fs::write(root.join(".env"), "APP_NAME=demo\nIGNITOR_TEST_ONLY_KEY=from-file\n").unwrap();
}

#[tokio::test]
async fn test_fire_boots_core_services() {
    let temp_dir = TempDir::new().unwrap();
    scaffold(temp_dir.path());

    let mut app = Application::new(temp_dir.path());
    app.fire().await.unwrap();
    assert!(app.is_booted());

    let config = app.config().await.unwrap();
    assert_eq!(config.get_str("app.name"), Some("demo"));

    let env = app.env().await.unwrap();
    assert_eq!(env.get("IGNITOR_TEST_ONLY_KEY").as_deref(), Some("from-file"));

    let container = app.container();
    for alias in [CONFIG_ALIAS, ENV_ALIAS, HELPERS_ALIAS, LOGGER_ALIAS] {
        assert!(container.has_alias(alias), "missing alias {alias}");
    }
    let helpers = container.resolve_alias::<Helpers>(HELPERS_ALIAS).await.unwrap();
    assert_eq!(helpers.app_root(), temp_dir.path());
    let by_alias = container.resolve_alias::<Config>(CONFIG_ALIAS).await.unwrap();
    assert!(Arc::ptr_eq(&config, &by_alias));
    assert!(container.resolve_alias::<Env>(ENV_ALIAS).await.is_ok());
}

#[tokio::test]
async fn test_boot_message_goes_through_configured_file() {
    let temp_dir = TempDir::new().unwrap();
    scaffold(temp_dir.path());

    let mut app = Application::new(temp_dir.path());
    app.fire().await.unwrap();
    app.fire().await.unwrap();

    let log = fs::read_to_string(temp_dir.path().join("logs/boot.log")).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("application ready"));

    let manager = app.logger().await.unwrap();
    let by_alias = app
        .container()
        .resolve_alias::<LoggerManager>(LOGGER_ALIAS)
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&manager, &by_alias));

    manager.debug("debug enabled by config").await.unwrap();
    let log = fs::read_to_string(temp_dir.path().join("logs/boot.log")).unwrap();
    assert_eq!(log.lines().count(), 2);
}

#[tokio::test]
async fn test_empty_root_boots_with_defaults() {
    let temp_dir = TempDir::new().unwrap();

    let mut app = Application::new(temp_dir.path());
    app.fire().await.unwrap();

    let manager = app.logger().await.unwrap();
    assert_eq!(manager.default_driver_name(), "file");
    assert!(app.env().await.unwrap().is_empty());
    assert!(!temp_dir.path().join("logs").exists());
}

#[tokio::test]
async fn test_broken_config_fails_boot() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("config")).unwrap();
    fs::write(temp_dir.path().join("config/app.toml"), "[logger\n").unwrap();

    let mut app = Application::new(temp_dir.path());
    let err = app.fire().await.unwrap_err();
    assert!(err.to_string().contains("app.toml"));
    assert!(!app.is_booted());
}

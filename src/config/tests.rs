use super::*;
use tempfile::{tempdir, TempDir};
use std::fs::File;
use std::io::Write;

/// Helper function to create a test configuration file
fn create_test_config_file(dir: &TempDir, content: &str) -> PathBuf {
    let config_path = dir.path().join("config.toml");
    let mut file = File::create(&config_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    config_path
}

/// Tests for Config::apply_update
#[test]
fn test_apply_update_with_all_values() {
    let config = Config {
        database_url: "original.db".to_string(),
        bind_address: "127.0.0.1:5000".to_string(),
        upload_dir: "uploads".to_string(),
    };

    let update = ConfigUpdate {
        database_url: Some("updated.db".to_string()),
        bind_address: Some("0.0.0.0:8080".to_string()),
        upload_dir: Some("/srv/uploads".to_string()),
    };

    let updated = config.apply_update(update);

    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.bind_address, "0.0.0.0:8080");
    assert_eq!(updated.upload_dir, "/srv/uploads");
}

#[test]
fn test_apply_update_with_partial_values() {
    let config = Config {
        database_url: "original.db".to_string(),
        bind_address: "127.0.0.1:5000".to_string(),
        upload_dir: "uploads".to_string(),
    };

    let update = ConfigUpdate {
        database_url: Some("updated.db".to_string()),
        bind_address: None,
        upload_dir: None,
    };

    let updated = config.apply_update(update);

    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.bind_address, "127.0.0.1:5000"); // Unchanged
    assert_eq!(updated.upload_dir, "uploads"); // Unchanged
}

#[test]
fn test_apply_update_with_no_values() {
    let config = Config {
        database_url: "original.db".to_string(),
        bind_address: "127.0.0.1:5000".to_string(),
        upload_dir: "uploads".to_string(),
    };

    let updated = config.clone().apply_update(ConfigUpdate::default());

    assert_eq!(updated, config);
}

/// Tests for config_from_file
#[test]
fn test_config_from_file_with_valid_file() {
    let dir = tempdir().unwrap();
    let config_path = create_test_config_file(
        &dir,
        r#"
database_url = "from_file.db"
bind_address = "0.0.0.0:9000"
"#,
    );

    let update = config_from_file(Some(config_path)).unwrap();

    assert_eq!(update.database_url.as_deref(), Some("from_file.db"));
    assert_eq!(update.bind_address.as_deref(), Some("0.0.0.0:9000"));
    assert_eq!(update.upload_dir, None);
}

#[test]
fn test_config_from_file_with_missing_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("does_not_exist.toml");

    let update = config_from_file(Some(config_path)).unwrap();

    assert!(update.database_url.is_none());
    assert!(update.bind_address.is_none());
}

#[test]
fn test_config_from_file_with_no_path() {
    let update = config_from_file(None).unwrap();

    assert!(update.database_url.is_none());
}

#[test]
fn test_config_from_file_with_invalid_toml() {
    let dir = tempdir().unwrap();
    let config_path = create_test_config_file(&dir, "this is { not toml");

    let result = config_from_file(Some(config_path));

    assert!(result.is_err());
}

/// Tests for base_config
#[test]
fn test_base_config_database_path() {
    let config = base_config(None);
    assert_eq!(config.database_url, "homeroom.db");

    let config = base_config(Some(PathBuf::from("/var/lib/homeroom")));
    assert!(config.database_url.ends_with("homeroom.db"));
    assert!(config.database_url.starts_with("/var/lib/homeroom"));
}

/// Tests for config_from_args
#[test]
fn test_config_from_args() {
    let args = CliArgs {
        database_url: Some("cli.db".to_string()),
        bind_address: None,
        upload_dir: Some("/tmp/uploads".to_string()),
        debug: false,
    };

    let update = config_from_args(args);

    assert_eq!(update.database_url.as_deref(), Some("cli.db"));
    assert_eq!(update.bind_address, None);
    assert_eq!(update.upload_dir.as_deref(), Some("/tmp/uploads"));
}

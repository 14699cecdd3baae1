use linkgrab_config::{BrowserKind, CookieScope, GrabConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
links_file: "${LINKGRAB_TEST_ROOT}/links.txt"
save_dir: /srv/grabs
browser:
  kind: chrome
  wait_timeout_secs: 4
http:
  cookie_scope: shared
  "#;
    let p = write_yaml(&tmp, "linkgrab.yaml", file_yaml);

    let config = temp_env::with_var("LINKGRAB_TEST_ROOT", Some("/data"), || {
        GrabConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config")
    });

    assert_eq!(config.links_file, PathBuf::from("/data/links.txt"));
    assert_eq!(config.archive_path(), PathBuf::from("/srv/grabs/downloaded_files.zip"));
    assert_eq!(config.browser.kind, BrowserKind::Chrome);
    assert_eq!(config.browser.wait_timeout_secs, 4);
    assert_eq!(config.browser.trigger_text, "Download this file");
    assert!(config.browser.headless);
    assert_eq!(config.http.cookie_scope, CookieScope::Shared);
    assert!(config.http.user_agent.contains("Chrome/91.0.4472.124"));
}

#[test]
#[serial]
fn env_overrides_file_and_cli_overrides_env() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "linkgrab.yaml",
        "links_file: from-file.txt\nsave_dir: out\nbrowser:\n  headless: true\n",
    );

    let config = temp_env::with_vars(
        [
            ("LINKGRAB__BROWSER__HEADLESS", Some("false")),
            ("LINKGRAB__LINKS_FILE", Some("from-env.txt")),
        ],
        || {
            GrabConfigLoader::new()
                .with_file(&p)
                .with_override("links_file", "from-cli.txt")
                .expect("override")
                .load()
                .expect("load config")
        },
    );

    assert!(!config.browser.headless);
    assert_eq!(config.links_file, PathBuf::from("from-cli.txt"));
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_overrides() {
    let tmp = TempDir::new().unwrap();

    let config = GrabConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .with_override("links_file", "links.txt")
        .and_then(|l| l.with_override("save_dir", "out"))
        .expect("overrides")
        .load()
        .expect("load config");

    assert_eq!(config.links_file, PathBuf::from("links.txt"));
    assert_eq!(config.http.cookie_scope, CookieScope::PerLink);
}

#[test]
#[serial]
fn missing_required_paths_fail_validation() {
    let err = GrabConfigLoader::new()
        .with_yaml_str("archive_name: batch.zip")
        .load()
        .expect_err("paths are required");

    let msg = err.to_string();
    assert!(msg.contains("links_file is required"), "{msg}");
    assert!(msg.contains("save_dir is required"), "{msg}");
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = GrabConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

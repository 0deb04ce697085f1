use serial_test::serial;
use std::fs::write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), yaml).unwrap();
    config_file
}

/// A full config maps every section onto the site settings.
#[tokio::test]
#[serial]
async fn test_load_config_full() {
    let config_file = config_file(
        r#"
site:
  base_url: https://www.example.co.uk
  locale: en-GB
content:
  include_depth: 4
  max_path_depth: 3
  service_root: services
fetch:
  timeout_secs: 5
  max_retries: 1
  backoff_ms: 50
api:
  delivery_url: https://preview.contentful.com
singletons:
  navigation: 5nAvIgAtIoN
  footer: 7FMIdPlW6GP9JdFGBZcKlM
  og_image: ogDefault
"#,
    );

    let settings =
        forecourt::load_config::load_config(config_file.path()).expect("Config should load");

    assert_eq!(settings.base_url, "https://www.example.co.uk");
    assert_eq!(settings.locale, "en-GB");
    assert_eq!(settings.include_depth, 4);
    assert_eq!(settings.max_path_depth, 3);
    assert_eq!(settings.service_root.as_deref(), Some("services"));
    assert_eq!(settings.fetch.timeout, Duration::from_secs(5));
    assert_eq!(settings.fetch.max_retries, 1);
    assert_eq!(settings.fetch.backoff, Duration::from_millis(50));
    assert_eq!(settings.api.delivery_url, "https://preview.contentful.com");
    assert_eq!(settings.api.management_url, "https://api.contentful.com");
    assert_eq!(
        settings.singletons.footer.as_deref(),
        Some("7FMIdPlW6GP9JdFGBZcKlM")
    );
    assert!(settings.singletons.logo_asset.is_none());
}

/// Only the site section is required; everything else has defaults.
#[tokio::test]
#[serial]
async fn test_load_config_defaults() {
    let config_file = config_file("site:\n  base_url: https://www.example.co.uk\n");

    let settings =
        forecourt::load_config::load_config(config_file.path()).expect("Config should load");

    assert_eq!(settings.locale, "en-US");
    assert_eq!(settings.include_depth, 3);
    assert_eq!(settings.max_path_depth, 5);
    assert!(settings.service_root.is_none());
    assert_eq!(settings.fetch.max_retries, 2);
    assert_eq!(settings.fetch.timeout, Duration::from_secs(10));
}

#[tokio::test]
#[serial]
async fn test_load_config_errors_on_missing_base_url() {
    let config_file = config_file("site:\n  locale: en-GB\n");

    let err = forecourt::load_config::load_config(config_file.path())
        .expect_err("base_url is required");
    assert!(err.to_string().contains("site.base_url"));
}

#[tokio::test]
#[serial]
async fn test_load_config_rejects_include_depth_over_ten() {
    let config_file = config_file(
        "site:\n  base_url: https://www.example.co.uk\ncontent:\n  include_depth: 11\n",
    );

    let err = forecourt::load_config::load_config(config_file.path())
        .expect_err("include depth is capped");
    assert!(err.to_string().contains("content.include_depth"));
}

#[tokio::test]
#[serial]
async fn test_load_config_errors_on_missing_file() {
    let result = forecourt::load_config::load_config("does/not/exist.yaml");
    assert!(result.is_err());
}

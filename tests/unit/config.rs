use super::*;

#[test]
fn empty_object_is_all_defaults() {
    let cfg = AdforgeConfig::from_json("{}").unwrap();
    assert_eq!(cfg, AdforgeConfig::default());
    assert_eq!(cfg.compositor.image_timeout(), Duration::from_secs(5));
    assert_eq!(cfg.compositor.output, OutputFormat::Jpeg { quality: 90 });
    assert_eq!(cfg.compositor.font_family, "Arial");
    assert!(!cfg.compositor.button_chrome);
    assert_eq!(cfg.storage.key, "ad_creator_templates");
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn partial_overrides() {
    let cfg = AdforgeConfig::from_json(
        r#"{
            "compositor": { "output": { "format": "png" }, "button_chrome": true },
            "storage": { "dir": "/tmp/x", "retry": { "max_attempts": 5, "base_delay": 10 } },
            "logging": { "json": true }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.compositor.output, OutputFormat::Png);
    assert!(cfg.compositor.button_chrome);
    assert_eq!(cfg.compositor.image_timeout_ms, 5_000);
    assert_eq!(cfg.storage.dir, PathBuf::from("/tmp/x"));
    assert_eq!(cfg.storage.retry.max_attempts, 5);
    assert_eq!(cfg.storage.retry.base_delay, Duration::from_millis(10));
    assert!(cfg.logging.json);
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn unreadable_or_invalid_files() {
    let dir = tempfile::tempdir().unwrap();
    assert!(AdforgeConfig::from_path(dir.path().join("missing.json")).is_err());

    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = AdforgeConfig::from_path(&path).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Validation);
}

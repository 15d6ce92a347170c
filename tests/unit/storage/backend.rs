use super::*;

#[test]
fn memory_read_write_remove() {
    let s = MemoryStorage::new();
    assert_eq!(s.read("k").unwrap(), None);
    s.write("k", "v1").unwrap();
    s.write("k", "v2").unwrap();
    assert_eq!(s.read("k").unwrap().as_deref(), Some("v2"));
    s.remove("k").unwrap();
    s.remove("k").unwrap();
    assert_eq!(s.read("k").unwrap(), None);
}

#[test]
fn memory_quota_rejects_without_clobbering() {
    let s = MemoryStorage::with_quota(10);
    s.write("k", "1234").unwrap();
    let err = s.write("k", "1234567890").unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));
    assert_eq!(s.read("k").unwrap().as_deref(), Some("1234"));
    // Replacing a value only counts the new size.
    s.write("k", "12345678").unwrap();
}

#[test]
fn file_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let s = FileStorage::new(dir.path().join("nested")).with_retry(RetryPolicy::once());
    assert_eq!(s.read("templates").unwrap(), None);

    s.write("templates", "[1,2]").unwrap();
    assert_eq!(s.read("templates").unwrap().as_deref(), Some("[1,2]"));
    assert!(dir.path().join("nested/templates.json").is_file());
    assert!(!dir.path().join("nested/templates.json.tmp").exists());

    s.remove("templates").unwrap();
    s.remove("templates").unwrap();
    assert_eq!(s.read("templates").unwrap(), None);
}

#[test]
fn file_storage_rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let s = FileStorage::new(dir.path());
    for key in ["", "../x", "a/b", ".hidden"] {
        assert!(s.write(key, "x").is_err(), "{key}");
    }
}

#[test]
fn file_write_failure_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "x").unwrap();
    // The storage "directory" is a regular file, so every attempt fails.
    let s = FileStorage::new(&blocker).with_retry(RetryPolicy {
        max_attempts: 2,
        base_delay: std::time::Duration::from_millis(1),
    });
    let err = s.write("k", "v").unwrap_err();
    assert!(matches!(err, AdError::Storage(_)));
}

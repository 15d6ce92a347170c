use std::time::Duration;

use super::*;

#[test]
fn reads_file_urls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bytes.bin");
    std::fs::write(&path, [1u8, 2, 3]).unwrap();

    let fetcher = UrlFetcher::new(Duration::from_secs(1), false);
    let url = url::Url::from_file_path(&path).unwrap();
    assert_eq!(fetcher.fetch(&url).unwrap(), vec![1, 2, 3]);

    let missing = url::Url::from_file_path(dir.path().join("nope.png")).unwrap();
    assert!(matches!(fetcher.fetch(&missing), Err(FetchError::Failed(_))));
}

#[test]
fn remote_disabled_is_blocked() {
    let fetcher = UrlFetcher::new(Duration::from_secs(1), false);
    let url = url::Url::parse("https://example.com/logo.png").unwrap();
    assert!(matches!(fetcher.fetch(&url), Err(FetchError::Blocked(_))));
}

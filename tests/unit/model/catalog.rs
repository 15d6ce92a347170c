use super::*;

#[test]
fn builtin_platform_counts() {
    let c = Catalog::builtin();
    assert_eq!(c.sizes_by_platform("google").len(), 5);
    assert_eq!(c.sizes_by_platform("facebook").len(), 3);
    assert_eq!(c.sizes_by_platform("linkedin").len(), 2);
    assert_eq!(c.sizes_by_platform("twitter").len(), 1);
    assert_eq!(c.sizes_by_platform("tiktok").len(), 1);
    assert!(c.sizes_by_platform("myspace").is_empty());
    assert_eq!(c.all_sizes().count(), 12);
}

#[test]
fn sizes_are_positive_and_ids_unique() {
    let c = Catalog::builtin();
    let mut ids: Vec<&str> = c.all_sizes().map(|s| s.id.as_str()).collect();
    assert!(c.all_sizes().all(|s| s.width > 0 && s.height > 0));
    let n = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), n);
}

#[test]
fn find_size_and_labels() {
    let c = Catalog::builtin();
    let s = c.find_size("fb-feed-1200x628").unwrap();
    assert_eq!((s.width, s.height), (1200, 628));
    assert_eq!(s.dimensions_label(), "1200x628");
    assert!(c.find_size("nope").is_none());
    assert_eq!(
        c.platform_labels(),
        vec!["Google Ads", "Facebook", "LinkedIn", "Twitter", "TikTok"]
    );
}

use super::*;

#[test]
fn blank_and_malformed_references() {
    assert_eq!(ImageRef::parse(""), Err(UnresolvedReason::Empty));
    assert_eq!(ImageRef::parse("   "), Err(UnresolvedReason::Empty));
    assert!(matches!(
        ImageRef::parse("logo.png"),
        Err(UnresolvedReason::Malformed(_))
    ));
    assert!(matches!(
        ImageRef::parse("blob:https://example.com/5f1c"),
        Err(UnresolvedReason::Malformed(_))
    ));
    assert!(matches!(
        ImageRef::parse("data:text/plain;base64,aGk="),
        Err(UnresolvedReason::Malformed(_))
    ));
    assert!(matches!(
        ImageRef::parse("data:image/png;base64"),
        Err(UnresolvedReason::Malformed(_))
    ));
}

#[test]
fn classifies_schemes() {
    assert!(matches!(
        ImageRef::parse("https://cdn.example.com/logo.png"),
        Ok(ImageRef::Remote(_))
    ));
    assert!(matches!(
        ImageRef::parse("file:///tmp/logo.png"),
        Ok(ImageRef::File(_))
    ));
    let r = ImageRef::parse("DATA:image/PNG;base64,AAAA").unwrap();
    assert!(r.is_embedded());
    let ImageRef::Data(d) = r else { unreachable!() };
    assert_eq!(d.mime, "image/png");
    assert!(d.base64);
}

#[test]
fn strict_and_lenient_payload_decoding() {
    let url = DataUrl::encode("image/png", &[0xfb, 0xff, 0x01]);
    let ImageRef::Data(d) = ImageRef::parse(&url).unwrap() else {
        unreachable!()
    };
    assert_eq!(d.strict_bytes().unwrap(), vec![0xfb, 0xff, 0x01]);

    // URL-safe alphabet, no padding, wrapped over lines.
    let mangled = DataUrl {
        mime: "image/png".to_owned(),
        base64: true,
        payload: "-_8\nB".to_owned(),
    };
    assert!(mangled.strict_bytes().is_err());
    assert_eq!(mangled.lenient_bytes().unwrap(), vec![0xfb, 0xff, 0x01]);
}

#[test]
fn percent_encoded_payloads() {
    let d = DataUrl::parse("data:image/svg+xml,%3Csvg%3E%3C/svg%3E").unwrap();
    assert!(!d.base64);
    assert_eq!(d.strict_bytes().unwrap(), b"<svg></svg>".to_vec());
    let broken = DataUrl::parse("data:image/svg+xml,%3").unwrap();
    assert!(broken.strict_bytes().is_err());
}

#[test]
fn describe_truncates_long_references() {
    assert_eq!(describe_reference("https://a/b.png"), "https://a/b.png");
    let long = format!("data:image/png;base64,{}", "A".repeat(500));
    let d = describe_reference(&long);
    assert!(d.len() < 100);
    assert!(d.ends_with(&format!("({} bytes)", long.len())));
}

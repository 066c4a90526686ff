use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(GiftermError::search("x").to_string().contains("search error:"));
    assert!(GiftermError::fetch("x").to_string().contains("fetch error:"));
    assert!(
        GiftermError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(GiftermError::decode("x").to_string().contains("decode error:"));
    assert!(GiftermError::render("x").to_string().contains("render error:"));
    assert!(GiftermError::store("x").to_string().contains("store error:"));
    assert!(
        GiftermError::NotFound(ContentId::search("abc"))
            .to_string()
            .contains("search:abc")
    );
}

#[test]
fn only_store_and_admission_are_soft() {
    assert!(GiftermError::AdmissionRejected.is_soft());
    assert!(GiftermError::store("disk full").is_soft());
    assert!(!GiftermError::fetch("timeout").is_soft());
    assert!(!GiftermError::decode("bad gif").is_soft());
    assert!(!GiftermError::EmptySequence.is_soft());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GiftermError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

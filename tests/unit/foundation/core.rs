use super::*;

#[test]
fn content_id_is_stable_for_same_bytes() {
    let a = ContentId::from_bytes(b"GIF89a....");
    let b = ContentId::from_bytes(b"GIF89a....");
    assert_eq!(a, b);
    assert!(a.as_str().starts_with("blob:"));
    assert_eq!(a.as_str().len(), "blob:".len() + 32);
}

#[test]
fn content_id_differs_for_different_bytes() {
    assert_ne!(
        ContentId::from_bytes(b"GIF89a-one"),
        ContentId::from_bytes(b"GIF89a-two")
    );
}

#[test]
fn search_and_blob_namespaces_never_collide() {
    let blob = ContentId::from_bytes(b"x");
    let digest = blob.as_str().trim_start_matches("blob:");
    assert_ne!(ContentId::search(digest), blob);
    assert_eq!(ContentId::search("123").to_string(), "search:123");
}

#[test]
fn rendered_frame_rejects_cursor_sequences() {
    assert!(RenderedFrame::new("\x1b[38;2;1;2;3m▄\x1b[0m\n", 5).is_ok());
    assert!(RenderedFrame::new(format!("a{CLEAR_SCREEN}"), 0).is_err());
    assert!(RenderedFrame::new(format!("{CURSOR_HOME}b"), 0).is_err());
    assert!(RenderedFrame::new("\x1b[Hc", 0).is_err());
}

#[test]
fn rendered_frame_delay_is_centiseconds() {
    let f = RenderedFrame::new("x", 7).unwrap();
    assert_eq!(f.delay(), std::time::Duration::from_millis(70));
}

#[test]
fn rect_union_and_size() {
    let a = Rect::from_origin_size(0, 0, 4, 2);
    let b = Rect::from_origin_size(3, 1, 5, 5);
    let u = a.union(b);
    assert_eq!(u, Rect { x0: 0, y0: 0, x1: 8, y1: 6 });
    assert_eq!((u.width(), u.height()), (8, 6));
    assert!(Rect::default().is_empty());
}

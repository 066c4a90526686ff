use std::sync::Arc;

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "gifterm_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn seq(tag: &str, n: u32) -> Vec<RenderedFrame> {
    (0..n)
        .map(|i| RenderedFrame::new(format!("{tag}-{i}"), i * 2).unwrap())
        .collect()
}

#[test]
fn put_then_fetch_both_orders() {
    let dir = temp_dir("fs_store_orders");
    let store = FsFrameStore::open(&dir).unwrap();
    let id = ContentId::search("xyz");

    assert!(!store.exists(&id).unwrap());
    assert_eq!(store.put(&id, &seq("a", 4)).unwrap(), PutOutcome::Inserted);
    assert!(store.exists(&id).unwrap());

    let fwd = store.fetch(&id, FrameOrder::Ascending).unwrap().unwrap();
    assert_eq!(fwd, seq("a", 4));
    let mut rev = store.fetch(&id, FrameOrder::Descending).unwrap().unwrap();
    rev.reverse();
    assert_eq!(rev, fwd);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn second_put_keeps_first_writer() {
    let dir = temp_dir("fs_store_first_writer");
    let store = FsFrameStore::open(&dir).unwrap();
    let id = ContentId::from_bytes(b"gif");

    assert_eq!(store.put(&id, &seq("first", 2)).unwrap(), PutOutcome::Inserted);
    assert_eq!(
        store.put(&id, &seq("second", 3)).unwrap(),
        PutOutcome::AlreadyPresent
    );
    assert_eq!(
        store.fetch(&id, FrameOrder::Ascending).unwrap().unwrap(),
        seq("first", 2)
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn concurrent_puts_store_exactly_one_sequence() {
    let dir = temp_dir("fs_store_race");
    let store = Arc::new(FsFrameStore::open(&dir).unwrap());
    let id = ContentId::search("race");

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            let id = id.clone();
            std::thread::spawn(move || store.put(&id, &seq(&format!("t{t}"), 3)).unwrap())
        })
        .collect();
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        outcomes.iter().filter(|o| **o == PutOutcome::Inserted).count(),
        1
    );

    let json_files = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|x| x == "json"))
        .count();
    assert_eq!(json_files, 1);
    let leftover_tmp = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|x| x == "tmp"))
        .count();
    assert_eq!(leftover_tmp, 0);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_and_corrupt_entries() {
    let dir = temp_dir("fs_store_corrupt");
    let store = FsFrameStore::open(&dir).unwrap();
    let id = ContentId::search("c");
    assert!(store.fetch(&id, FrameOrder::Ascending).unwrap().is_none());

    std::fs::write(store.path_for(&id), b"{not json").unwrap();
    assert!(matches!(
        store.fetch(&id, FrameOrder::Ascending),
        Err(GiftermError::Store(_))
    ));

    std::fs::remove_dir_all(&dir).ok();
}

#[cfg(target_os = "linux")]
#[test]
fn failed_temp_write_leaves_nothing_behind() {
    if !Path::new("/dev/full").exists() {
        return;
    }
    let dir = temp_dir("fs_store_full");
    std::fs::create_dir_all(&dir).unwrap();
    let tmp = dir.join("partial.tmp");
    std::os::unix::fs::symlink("/dev/full", &tmp).unwrap();

    let err = write_temp(&tmp, b"frames").unwrap_err();
    assert!(matches!(err, GiftermError::Store(_)), "{err:?}");
    assert!(std::fs::symlink_metadata(&tmp).is_err());

    std::fs::remove_dir_all(&dir).ok();
}

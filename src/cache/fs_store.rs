use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cache::store::{FrameOrder, FrameStore, PutOutcome};
use crate::foundation::core::{ContentId, RenderedFrame};
use crate::foundation::error::{GiftermError, GiftermResult};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StoredRow {
    index: u32,
    delay_cs: u32,
    text: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StoredSequence {
    id: ContentId,
    rows: Vec<StoredRow>,
}

/// Directory-backed store: one JSON document per content id.
///
/// Writes go to a private temp file that is then hard-linked into place, so a second writer for
/// the same id observes `AlreadyExists` instead of replacing the first writer's frames. This also
/// holds across processes sharing the directory.
#[derive(Debug, Clone)]
pub struct FsFrameStore {
    root: PathBuf,
}

impl FsFrameStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> GiftermResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create frame store dir '{}'", root.display()))?;
        Ok(Self { root })
    }

    /// Store directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &ContentId) -> PathBuf {
        let digest = xxhash_rust::xxh3::xxh3_128(id.as_str().as_bytes());
        self.root.join(format!("{digest:032x}.json"))
    }

    fn temp_path_for(&self, id: &ContentId) -> PathBuf {
        let digest = xxhash_rust::xxh3::xxh3_64(id.as_str().as_bytes());
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let thread = format!("{:?}", std::thread::current().id())
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>();
        self.root.join(format!(
            ".{digest:016x}.{}.{thread}.{nanos}.tmp",
            std::process::id()
        ))
    }
}

impl FrameStore for FsFrameStore {
    fn exists(&self, id: &ContentId) -> GiftermResult<bool> {
        let path = self.path_for(id);
        path.try_exists()
            .map_err(|e| GiftermError::store(format!("stat '{}': {e}", path.display())))
    }

    fn fetch(
        &self,
        id: &ContentId,
        order: FrameOrder,
    ) -> GiftermResult<Option<Vec<RenderedFrame>>> {
        let path = self.path_for(id);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(GiftermError::store(format!(
                    "read '{}': {e}",
                    path.display()
                )));
            }
        };
        let doc: StoredSequence = serde_json::from_slice(&bytes)
            .map_err(|e| GiftermError::store(format!("parse '{}': {e}", path.display())))?;
        if doc.id != *id {
            return Err(GiftermError::store(format!(
                "'{}' holds frames for '{}', not '{id}'",
                path.display(),
                doc.id
            )));
        }

        let mut rows = doc.rows;
        match order {
            FrameOrder::Ascending => rows.sort_by_key(|r| r.index),
            FrameOrder::Descending => rows.sort_by_key(|r| std::cmp::Reverse(r.index)),
        }
        Ok(Some(
            rows.into_iter()
                .map(|r| RenderedFrame {
                    text: r.text,
                    delay_cs: r.delay_cs,
                })
                .collect(),
        ))
    }

    fn put(&self, id: &ContentId, frames: &[RenderedFrame]) -> GiftermResult<PutOutcome> {
        let doc = StoredSequence {
            id: id.clone(),
            rows: frames
                .iter()
                .enumerate()
                .map(|(i, f)| StoredRow {
                    index: i as u32,
                    delay_cs: f.delay_cs,
                    text: f.text.clone(),
                })
                .collect(),
        };
        let bytes = serde_json::to_vec(&doc)
            .map_err(|e| GiftermError::store(format!("serialize frames for '{id}': {e}")))?;

        let tmp = self.temp_path_for(id);
        write_temp(&tmp, &bytes)?;
        let target = self.path_for(id);
        let linked = std::fs::hard_link(&tmp, &target);
        let _ = std::fs::remove_file(&tmp);
        match linked {
            Ok(()) => Ok(PutOutcome::Inserted),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(PutOutcome::AlreadyPresent),
            Err(e) => Err(GiftermError::store(format!(
                "publish '{}': {e}",
                target.display()
            ))),
        }
    }
}

/// Write `bytes` to `tmp`, removing whatever was partially written on failure.
fn write_temp(tmp: &Path, bytes: &[u8]) -> GiftermResult<()> {
    std::fs::write(tmp, bytes).map_err(|e| {
        let _ = std::fs::remove_file(tmp);
        GiftermError::store(format!("write '{}': {e}", tmp.display()))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/cache/fs_store.rs"]
mod tests;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::foundation::core::{ContentId, RenderedFrame};
use crate::foundation::error::GiftermResult;

/// Row order for [`FrameStore::fetch`], by frame index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOrder {
    /// First frame first.
    Ascending,
    /// Last frame first.
    Descending,
}

impl FrameOrder {
    /// Order matching a caller's reverse flag.
    pub fn from_reversed(reversed: bool) -> Self {
        if reversed {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

/// Result of an insert-if-absent write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PutOutcome {
    /// The sequence was stored.
    Inserted,
    /// Another writer got there first; the existing sequence was kept.
    AlreadyPresent,
}

/// Persistence boundary for rendered frame sequences.
///
/// `put` must be an atomic insert-if-absent: an id's frames never change once stored.
pub trait FrameStore: Send + Sync {
    /// Whether a sequence is stored for `id`.
    fn exists(&self, id: &ContentId) -> GiftermResult<bool>;

    /// Stored frames in the requested order, or `None` when absent.
    fn fetch(&self, id: &ContentId, order: FrameOrder)
    -> GiftermResult<Option<Vec<RenderedFrame>>>;

    /// Store `frames` (canonical forward order) unless `id` is already present.
    fn put(&self, id: &ContentId, frames: &[RenderedFrame]) -> GiftermResult<PutOutcome>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryFrameStore {
    entries: Mutex<HashMap<ContentId, Arc<Vec<RenderedFrame>>>>,
    inserts: AtomicUsize,
}

impl MemoryFrameStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sequences.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Successful inserts since creation.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ContentId, Arc<Vec<RenderedFrame>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameStore for MemoryFrameStore {
    fn exists(&self, id: &ContentId) -> GiftermResult<bool> {
        Ok(self.lock().contains_key(id))
    }

    fn fetch(
        &self,
        id: &ContentId,
        order: FrameOrder,
    ) -> GiftermResult<Option<Vec<RenderedFrame>>> {
        let Some(frames) = self.lock().get(id).cloned() else {
            return Ok(None);
        };
        let mut frames = frames.as_ref().clone();
        if order == FrameOrder::Descending {
            frames.reverse();
        }
        Ok(Some(frames))
    }

    fn put(&self, id: &ContentId, frames: &[RenderedFrame]) -> GiftermResult<PutOutcome> {
        match self.lock().entry(id.clone()) {
            Entry::Occupied(_) => Ok(PutOutcome::AlreadyPresent),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(frames.to_vec()));
                self.inserts.fetch_add(1, Ordering::SeqCst);
                Ok(PutOutcome::Inserted)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;

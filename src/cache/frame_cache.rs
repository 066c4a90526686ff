use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::store::{FrameOrder, FrameStore, PutOutcome};
use crate::foundation::core::{ContentId, RenderedFrame};
use crate::foundation::error::{GiftermError, GiftermResult};

/// Where the frames returned by [`FrameCache::get_or_render`] came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// Served from the store without rendering.
    Hit(Vec<RenderedFrame>),
    /// Rendered by this call.
    Rendered(Vec<RenderedFrame>),
}

impl Lookup {
    /// Frames regardless of origin.
    pub fn into_frames(self) -> Vec<RenderedFrame> {
        match self {
            Self::Hit(frames) | Self::Rendered(frames) => frames,
        }
    }

    /// `true` for [`Lookup::Hit`].
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

type SlotTable = HashMap<ContentId, Arc<Mutex<()>>>;

/// Content-id keyed cache of rendered frame sequences.
///
/// Two layers keep at most one sequence per id: [`FrameCache::get_or_render`] serializes
/// check/render/store per id inside this process, and the store's insert-if-absent `put` covers
/// writers in other processes.
pub struct FrameCache {
    store: Arc<dyn FrameStore>,
    slots: Mutex<SlotTable>,
}

impl std::fmt::Debug for FrameCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCache")
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

impl FrameCache {
    /// Cache over `store`.
    pub fn new(store: Arc<dyn FrameStore>) -> Self {
        Self {
            store,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Whether frames are stored for `id`. Store failures read as "absent".
    pub fn exists(&self, id: &ContentId) -> bool {
        self.store.exists(id).unwrap_or_else(|e| {
            tracing::warn!(%id, error = %e, "frame store existence check failed");
            false
        })
    }

    /// Stored frames for `id`; reversal flips frame order and keeps each frame's delay.
    pub fn fetch(&self, id: &ContentId, reversed: bool) -> GiftermResult<Vec<RenderedFrame>> {
        self.store
            .fetch(id, FrameOrder::from_reversed(reversed))?
            .ok_or_else(|| GiftermError::NotFound(id.clone()))
    }

    /// Insert `frames` for `id` unless something is already stored.
    pub fn store(&self, id: &ContentId, frames: &[RenderedFrame]) -> GiftermResult<PutOutcome> {
        self.store.put(id, frames)
    }

    /// Return cached frames for `id`, or render, store and return them.
    ///
    /// The id's slot is held across the check, the render and the store, so concurrent first
    /// requests for one id render once; other ids proceed independently. A failed store is
    /// logged and the fresh frames are still returned. Reversal applies to the returned copy
    /// only; the store always holds forward order.
    pub fn get_or_render<F>(
        &self,
        id: &ContentId,
        reversed: bool,
        render: F,
    ) -> GiftermResult<Lookup>
    where
        F: FnOnce() -> GiftermResult<Vec<RenderedFrame>>,
    {
        let slot = self.slot(id);
        let _held = slot.lock();

        match self.fetch(id, reversed) {
            Ok(frames) => {
                tracing::info!(%id, frames = frames.len(), "frame cache hit");
                return Ok(Lookup::Hit(frames));
            }
            Err(GiftermError::NotFound(_)) => {
                tracing::info!(%id, "frame cache miss");
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "frame cache read failed; rendering fresh");
            }
        }

        let mut frames = render()?;
        match self.store(id, &frames) {
            Ok(PutOutcome::Inserted) => {
                tracing::info!(%id, frames = frames.len(), "stored rendered frames");
            }
            Ok(PutOutcome::AlreadyPresent) => {
                // First writer wins: serve the canonical copy when it is readable.
                if let Ok(stored) = self.fetch(id, false) {
                    frames = stored;
                }
                tracing::info!(%id, "frames already stored by another writer");
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "failed to store rendered frames");
            }
        }
        if reversed {
            frames.reverse();
        }
        Ok(Lookup::Rendered(frames))
    }

    /// Ids with a request currently holding or waiting on their slot.
    pub fn in_flight(&self) -> usize {
        self.lock_slots().len()
    }

    fn slot(&self, id: &ContentId) -> SlotHandle<'_> {
        let slot = Arc::clone(self.lock_slots().entry(id.clone()).or_default());
        SlotHandle {
            cache: self,
            id: id.clone(),
            slot: Some(slot),
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, SlotTable> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared per-id mutex; the table entry is dropped with its last handle.
struct SlotHandle<'a> {
    cache: &'a FrameCache,
    id: ContentId,
    slot: Option<Arc<Mutex<()>>>,
}

impl SlotHandle<'_> {
    fn lock(&self) -> Option<MutexGuard<'_, ()>> {
        self.slot
            .as_ref()
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Drop for SlotHandle<'_> {
    fn drop(&mut self) {
        let mut slots = self.cache.lock_slots();
        // Release our reference under the table lock so counts seen by other handles are exact.
        drop(self.slot.take());
        if slots
            .get(&self.id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/frame_cache.rs"]
mod tests;

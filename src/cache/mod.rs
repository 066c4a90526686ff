pub(crate) mod frame_cache;
pub(crate) mod fs_store;
pub(crate) mod store;

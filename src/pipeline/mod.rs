pub(crate) mod fallback;
#[allow(clippy::module_inception)]
pub(crate) mod pipeline;

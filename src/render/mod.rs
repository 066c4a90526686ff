pub(crate) mod adapter;
pub(crate) mod ansi;
pub(crate) mod renderer;

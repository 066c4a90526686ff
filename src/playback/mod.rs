pub(crate) mod emitter;

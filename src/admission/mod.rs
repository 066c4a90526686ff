pub(crate) mod limiter;

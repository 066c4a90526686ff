pub(crate) mod fetch;
pub(crate) mod search;
pub(crate) mod select;

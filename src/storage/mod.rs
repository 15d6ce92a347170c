pub(crate) mod backend;
pub(crate) mod exchange;
pub(crate) mod store;

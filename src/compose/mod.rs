pub(crate) mod batch;
pub(crate) mod compositor;

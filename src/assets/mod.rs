pub(crate) mod decode;
pub(crate) mod fetch;
pub(crate) mod font;
pub(crate) mod reference;
pub(crate) mod resolver;

pub(crate) mod page;
pub(crate) mod record;
pub(crate) mod viewer;

//! Internal helpers.

pub(crate) mod process;

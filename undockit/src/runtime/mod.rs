//! Runtime options and core data types.

pub mod options;
pub mod types;

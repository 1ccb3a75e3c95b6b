//! All internal logic for resolving galleries hosted on imgchest.com.

extern crate icdl_common;

pub mod error;
pub mod extractor;
pub mod extractor_config;
pub mod prelude;
pub mod websites;

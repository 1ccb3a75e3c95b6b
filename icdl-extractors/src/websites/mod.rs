//! Modules that resolve gallery info from supported websites into
//! [`Metadata`](icdl_common::gallery::Metadata) mappings and ordered
//! [`GalleryImage`](icdl_common::gallery::GalleryImage) lists.

pub mod imagechest;

//! JSON session rewriting
//!
//! - [`document`] - partially decoded export document with addressable sessions
//! - [`image_mask`] - record ID rewrite inside a session's image glob

pub mod document;
pub mod image_mask;

pub use document::{SessionDocument, VERSION_NOT_AVAILABLE};
pub use image_mask::rewrite_image_mask;

//! Core types for StylePreview.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credits;
pub mod email;
pub mod id;
pub mod slug;
pub mod status;

pub use credits::MAX_VARIATIONS;
pub use email::{Email, EmailError};
pub use id::*;
pub use slug::{Slug, SlugError};
pub use status::*;

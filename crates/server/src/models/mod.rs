//! Domain models for the API.
//!
//! These are the shapes the stores hand back and the routes serialize. JSON
//! field names follow the public API (`salonId`, `hairStyles`, ...) rather
//! than the Rust field names.

pub mod generation;
pub mod image;
pub mod session;
pub mod tenant;
pub mod user;

pub use generation::{GenerationRecord, NewGeneration};
pub use image::{NewImage, UploadedImage};
pub use session::{CurrentUser, Principal, keys as session_keys};
pub use tenant::{NewStyleEntry, NewTenant, StyleLibraryEntry, Tenant, TenantUpdate};
pub use user::{NewUser, ProfileUpdate, User};

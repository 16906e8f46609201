//! StylePreview Core - Shared domain types.
//!
//! This crate provides the types used across all StylePreview components:
//! - `server` - The multi-tenant HTTP API
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP clients. The credit cost table lives here because both the
//! server and the CLI need to agree on it.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, slugs, tenant/user enums and credit costs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

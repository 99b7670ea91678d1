//! SneakerShop Core - Shared types library.
//!
//! This crate provides common types used across the SneakerShop back office:
//! - `backoffice` - Form controllers, remote table client, dashboard
//! - `integration-tests` - End-to-end tests against an in-memory store
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no network access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and money

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

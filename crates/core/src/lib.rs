//! PawFortune Core - Shared types library.
//!
//! This crate provides the domain types used across all PawFortune components:
//! - `app` - Storage, quota bookkeeping, state machine and Gemini adapter
//! - `cli` - Command-line host and interactive play session
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Zodiac signs, user profiles, fortunes, daily usage and the
//!   capped collection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! ApexZenith core: diagnosis records, per-session state, and the durable
//! append-only log behind the dashboard.
//!
//! The server crate wires these pieces to HTTP; everything in here is plain
//! async Rust with no web types, so the diagnose flow can be driven directly
//! from tests.

pub mod config;
pub mod diagnosis;
pub mod session;
pub mod store;

//! Shared types for the Marlin banking platform
//!
//! Wire-level request/response types exchanged with the banking backend,
//! shared by the client crates. The backend serializes JSON in camelCase.

pub mod auth;

// Re-exports
pub use serde::{Deserialize, Serialize};

//! Wire types for the vmctl management RPC boundary.
//!
//! This crate contains the serde-serializable types exchanged with the
//! remote management service. These types represent the "protocol layer":
//! the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization
//! - **Wire-shaped**: Field names match the remote API (`camelCase`)
//! - **Stable**: Changes only when the wire protocol changes
//!
//! Transport and session behavior is built on top of these types in
//! `vmctl-runtime` and `vmctl`.

pub mod datastore;
pub mod envelope;
pub mod fault;
pub mod types;

pub use datastore::*;
pub use envelope::*;
pub use fault::*;
pub use types::*;

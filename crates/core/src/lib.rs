//! Typed client for the remote virtualization-management API.
//!
//! [`Client`] pairs a [`RoundTripper`](vmctl_runtime::RoundTripper) with the
//! service content the endpoint advertised when the connection was opened.
//! Managers borrow a client and expose the remote methods as typed calls:
//!
//! - [`SessionManager`]: login flows, current session, logout
//! - [`Finder`]: inventory path lookups
//! - [`DatastoreBrowser`]: datastore file searches
//!
//! [`Version`] implements dotted API version ordering used for
//! compatibility checks.

pub mod client;
pub mod datastore;
pub mod error;
pub mod finder;
pub mod session;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use client::Client;
pub use datastore::DatastoreBrowser;
pub use error::{Error, Result};
pub use finder::{Finder, Folder};
pub use session::SessionManager;
pub use version::Version;
/// Re-exported wire types.
pub use vmctl_protocol as protocol;
/// Re-exported transport layer.
pub use vmctl_runtime as runtime;

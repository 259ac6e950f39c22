//! Persistence layer for Grab.
//!
//! Stores per-workspace credentials as JSON files, written atomically
//! (temp file, then rename).
//!
//! # Example
//!
//! ```no_run
//! use grab_persistence::{CredentialStore, WorkspaceCredentials};
//!
//! let store = CredentialStore::new("/home/user/.grab/credentials");
//! let creds = WorkspaceCredentials::new(
//!     "T0123ABCD",
//!     "xoxb-...",
//!     "https://wiki.example.com",
//!     "grab",
//!     "secret",
//! );
//! store.save(&creds).unwrap();
//! let loaded = store.load("T0123ABCD").unwrap();
//! ```

pub mod atomic;
pub mod credentials;
pub mod error;

pub use credentials::{CredentialStore, WorkspaceCredentials};
pub use error::{PersistenceError, Result};

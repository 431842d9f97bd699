//! Shared types and adapter traits for the confstore configuration service.
//!
//! This crate contains the foundational types that are shared between the
//! core service crate and all storage adapter implementations. Extracting
//! these into a separate crate allows adapter crates to compile in parallel
//! with the service itself.

pub mod data_adapter;
pub mod error;
pub mod path;
pub mod perm;
pub mod prelude;
pub mod scope;

pub use data_adapter::DataAdapter;
pub use error::{CsResult, Error};
pub use path::{Path, Route, LEVELS};
pub use perm::Perm;
pub use scope::{ScopeId, ScopeKind};

// vim: ts=4

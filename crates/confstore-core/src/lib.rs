//! Hierarchical, scoped configuration service for multi-tenant servers.
//!
//! Values are addressed by a three segment route (`system/smtp/host`)
//! qualified by a scope (default, website, store) and a numeric scope id.
//! The [`Service`] resolves effective values by walking the scope hierarchy
//! from most specific to most general, publishes change events to
//! subscribers, and runs observers that validate or transform values around
//! reads and writes. Storage backends are pluggable through the
//! [`confstore_types::DataAdapter`] trait.

pub mod model;
pub mod observer;
pub mod prelude;
pub mod pubsub;
pub mod scoped;
pub mod service;
pub mod storage;

pub use observer::{Event, Observer, ObserverRegistry};
pub use pubsub::{MessageReceiver, PubSub};
pub use scoped::Scoped;
pub use service::{Service, ServiceBuilder, Setter};
pub use storage::MemoryStorage;

pub use confstore_types as types;

// vim: ts=4

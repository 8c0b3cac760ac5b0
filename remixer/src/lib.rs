//! Named, typed, constrained values ("variables") and zero-argument actions
//! ("triggers") that a host exposes for tweaking at runtime. Every live
//! instance of a variable sharing a key is kept consistent by a pluggable
//! [`sync::SynchronizationMechanism`], and the canonical state can be
//! serialized to a transport-neutral JSON tree.
//!
//! Start with [`registry::Remixer`].

pub mod core;
pub mod data;
pub mod error;
pub mod item;
pub mod prelude;
pub mod registry;
pub mod runtime;
pub mod serialization;
pub mod sync;

pub use error::{RemixerError, Result};
pub use registry::Remixer;

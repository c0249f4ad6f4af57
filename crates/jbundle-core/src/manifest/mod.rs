//! Manifest and lock manifest model and persistence.
//!
//! `jsonnetfile.json` declares direct dependencies; `jsonnetfile.lock.json`
//! pins every direct and transitive dependency. Both share one schema.

pub mod legacy;
pub mod store;
pub mod types;
pub mod wire;

pub use store::{ManifestStore, decode, encode};
pub use types::{LOCK_FILE, MANIFEST_FILE, Manifest, SCHEMA_VERSION};
pub use wire::{from_wire_list, to_wire_list};

//! High-level commands.
//!
//! Each command loads the project's manifest and lock, runs a resolution
//! pass and persists the results only when the pass succeeded. Frontends
//! call these with a [`ProjectContext`](crate::context::ProjectContext).

pub mod install;
pub mod update;

pub use install::{InstallCommand, InstallReport};
pub use update::UpdateCommand;

//! Configuration for resolution.
//!
//! User settings live in `<config_dir>/jbundle/config.toml`. They are read
//! once and turned into a [`ResolveOptions`] value that is passed explicitly
//! to the resolver; nothing is kept in global state.

mod options;
mod settings;

pub use options::{CollisionPolicy, ResolveOptions};
pub use settings::{Settings, default_settings_path, parse_settings_str};

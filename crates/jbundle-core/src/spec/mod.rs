//! Dependency specifications.
//!
//! This module provides the in-memory shape of a single dependency and the
//! parser that turns user-supplied references into one:
//! - Remote git sources (GitHub shorthand, SSH, SCP-like, generic HTTPS hosts)
//! - Local directory sources

mod parser;
mod source;

pub use parser::{MATCHERS, Matcher, parse, parse_required};
pub(crate) use source::normalize_subdir;
pub use source::{
    DEFAULT_VERSION, Dependency, GIT_SCHEME_HTTPS, GIT_SCHEME_SSH, GitSource, LocalSource, Source,
};

//! Git sources.
//!
//! - Shallow fetch with sparse checkout, shelling out to `git`
//! - GitHub archive downloads for `https://github.com` remotes

mod archive;
mod fetcher;

pub use archive::{archive_url, commit_from_etag};
pub use fetcher::GitInstaller;

#[cfg(test)]
mod tests;

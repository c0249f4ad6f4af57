//! Parsing of free-form dependency references.
//!
//! A reference is whatever a user types after `jb install`, or a remote URL
//! read back from an older manifest. Remote forms are recognised by an
//! ordered list of [`Matcher`] strategies; anything else is tried as a local
//! directory.
//!
//! Supported remote forms:
//! - `github.com/user/repo[/subdir][@version]`
//! - `ssh://git@host/user/repo.git[/subdir][@version]`
//! - `git@host:user/repo.git[/subdir][@version]`
//! - `host/group/subgroup/repo.git[/subdir][@version]`
//! - `[https://]host/user/repo[/subdir][@version]`

use std::path::{Component, Path};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};

use super::source::{
    DEFAULT_VERSION, Dependency, GIT_SCHEME_HTTPS, GIT_SCHEME_SSH, GitSource, LocalSource, Source,
    clean_path,
};

const GITHUB_SLUG: &str =
    r"(?:https://)?github\.com/(?P<user>[-_a-zA-Z0-9]+)/(?P<repo>[-_.a-zA-Z0-9]+?)(?:\.git)?";
const GIT_SSH: &str =
    r"ssh://git@(?P<host>[^/@]+)/(?P<user>[^@]+?)/(?P<repo>[^/@]+?)\.git";
const GIT_SCP: &str = r"git@(?P<host>[^:/@]+):(?P<user>[^@]+?)/(?P<repo>[^/@]+?)\.git";
const HOST: &str = r"(?P<host>[a-zA-Z0-9][-a-zA-Z0-9.]{1,61}[a-zA-Z0-9]\.[a-zA-Z]{2,})";
const SUBGROUP_OWNER: &str = r"(?P<user>[-_.a-zA-Z0-9~]+(?:/[-_.a-zA-Z0-9~]+)+)";
const OWNER: &str = r"(?P<user>[-_.a-zA-Z0-9~]+)";

// Path and version suffixes are both optional and collide textually, so the
// most specific form must be tried first.
const PATH_AND_VERSION: &str = r"/(?P<subdir>[^@]+)@(?P<version>.+)";
const PATH: &str = r"/(?P<subdir>[^@]+)";
const VERSION: &str = r"@(?P<version>.+)";

/// One recognised family of remote references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    GitHubSlug,
    GitSsh,
    GitScp,
    GitHttpsSubgroup,
    GitHttps,
}

/// Matchers in priority order.
pub const MATCHERS: &[Matcher] = &[
    Matcher::GitHubSlug,
    Matcher::GitSsh,
    Matcher::GitScp,
    Matcher::GitHttpsSubgroup,
    Matcher::GitHttps,
];

static GITHUB_SLUG_RE: LazyLock<[Regex; 4]> = LazyLock::new(|| compile_variants(GITHUB_SLUG));
static GIT_SSH_RE: LazyLock<[Regex; 4]> = LazyLock::new(|| compile_variants(GIT_SSH));
static GIT_SCP_RE: LazyLock<[Regex; 4]> = LazyLock::new(|| compile_variants(GIT_SCP));
static GIT_HTTPS_SUBGROUP_RE: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    compile_variants(&format!(
        r"(?:https://)?{HOST}/{SUBGROUP_OWNER}/(?P<repo>[-_.a-zA-Z0-9]+?)\.git"
    ))
});
static GIT_HTTPS_RE: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    compile_variants(&format!(
        r"(?:https://)?{HOST}/{OWNER}/(?P<repo>[-_.a-zA-Z0-9]+?)(?:\.git)?"
    ))
});

fn compile_variants(base: &str) -> [Regex; 4] {
    [PATH_AND_VERSION, PATH, VERSION, ""].map(|suffix| {
        Regex::new(&format!("^{base}{suffix}$")).expect("reference patterns are valid regexes")
    })
}

impl Matcher {
    fn variants(self) -> &'static [Regex; 4] {
        match self {
            Self::GitHubSlug => &GITHUB_SLUG_RE,
            Self::GitSsh => &GIT_SSH_RE,
            Self::GitScp => &GIT_SCP_RE,
            Self::GitHttpsSubgroup => &GIT_HTTPS_SUBGROUP_RE,
            Self::GitHttps => &GIT_HTTPS_RE,
        }
    }

    fn scheme(self) -> &'static str {
        match self {
            Self::GitSsh | Self::GitScp => GIT_SCHEME_SSH,
            Self::GitHubSlug | Self::GitHttpsSubgroup | Self::GitHttps => GIT_SCHEME_HTTPS,
        }
    }

    /// Try this matcher against `reference`.
    pub fn parse(self, reference: &str) -> Option<Dependency> {
        let captures = self
            .variants()
            .iter()
            .find_map(|re| re.captures(reference))?;

        let host = match self {
            Self::GitHubSlug => "github.com",
            _ => captures.name("host")?.as_str(),
        };
        let source = GitSource::new(
            self.scheme(),
            host,
            group(&captures, "user"),
            group(&captures, "repo"),
        )
        .with_subdir(group(&captures, "subdir"));

        let version = match group(&captures, "version") {
            "" => DEFAULT_VERSION,
            version => version,
        };
        Some(Dependency::new(Source::Git(source), version))
    }
}

fn group<'h>(captures: &Captures<'h>, name: &str) -> &'h str {
    captures.name(name).map(|m| m.as_str()).unwrap_or_default()
}

/// Parse a reference into a dependency.
///
/// Returns `None` for an empty reference, or when no remote pattern matches
/// and `base_dir/<reference>` is not an existing directory.
pub fn parse(base_dir: &Path, reference: &str) -> Option<Dependency> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    MATCHERS
        .iter()
        .find_map(|matcher| matcher.parse(reference))
        .or_else(|| parse_local(base_dir, reference))
}

/// Like [`parse`], but reports an unrecognised reference as an error.
pub fn parse_required(base_dir: &Path, reference: &str) -> Result<Dependency> {
    parse(base_dir, reference).ok_or_else(|| Error::SpecParse {
        reference: reference.to_string(),
    })
}

fn parse_local(base_dir: &Path, reference: &str) -> Option<Dependency> {
    let mut clean = clean_path(Path::new(reference));
    if !base_dir.join(&clean).is_dir() {
        return None;
    }

    // `.`, `..` and friends name no directory on their own; spell them as
    // `<path>/../<name>` so the canonical name is the directory's base name.
    if !matches!(clean.components().next_back(), Some(Component::Normal(_))) {
        let target = base_dir.join(&clean).canonicalize().ok()?;
        let name = target.file_name()?;
        clean = clean.join("..").join(name);
    }

    let directory = clean.to_string_lossy().into_owned();
    Some(Dependency::new(Source::Local(LocalSource::new(directory)), ""))
}

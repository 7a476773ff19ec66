//! core::types
//!
//! Strong types for the values gitfleet passes between the walker, the tip
//! classifier and the git layer.
//!
//! # Types
//!
//! - [`BranchName`] - Validated local branch name
//! - [`Oid`] - Git object identifier (SHA)
//! - [`RefName`] - Validated full reference name
//!
//! Values are validated at construction time, so a `BranchName` handed to
//! [`crate::git::Git::delete_branch`] can never smuggle in `..` or a
//! control character.
//!
//! # Examples
//!
//! ```
//! use gitfleet::core::types::{BranchName, Oid, RefName};
//!
//! let branch = BranchName::new("feature/my-branch").unwrap();
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let refname = RefName::for_branch(&branch);
//! assert_eq!(refname.as_str(), "refs/heads/feature/my-branch");
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! # let _ = oid;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),
}

/// Characters git refuses anywhere in a refname.
const FORBIDDEN_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];

/// Check the rules shared by branch names and full ref names
/// (see `git check-ref-format`). Returns the reason on failure.
fn check_refname_rules(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("cannot be empty".into());
    }
    if name.ends_with('/') {
        return Err("cannot end with '/'".into());
    }
    if name.ends_with(".lock") {
        return Err("cannot end with '.lock'".into());
    }
    for seq in ["..", "@{", "//"] {
        if name.contains(seq) {
            return Err(format!("cannot contain '{seq}'"));
        }
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(format!("cannot contain '{c}'"));
    }
    if name.chars().any(|c| c.is_ascii_control()) {
        return Err("cannot contain control characters".into());
    }
    for component in name.split('/').filter(|c| !c.is_empty()) {
        if component.starts_with('.') {
            return Err("path component cannot start with '.'".into());
        }
        if component.ends_with(".lock") {
            return Err("path component cannot end with '.lock'".into());
        }
    }
    Ok(())
}

/// A validated local branch name (the part after `refs/heads/`).
///
/// # Example
///
/// ```
/// use gitfleet::core::types::BranchName;
///
/// let name = BranchName::new("feature/my-branch").unwrap();
/// assert_eq!(name.as_str(), "feature/my-branch");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("-flag").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name == "@" {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be '@' (reserved)".into(),
            ));
        }
        if name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '-'".into(),
            ));
        }
        check_refname_rules(&name)
            .map_err(|reason| TypeError::InvalidBranchName(format!("branch name {reason}")))?;
        Ok(Self(name))
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A git object identifier (SHA-1 or SHA-256), normalized to lowercase.
///
/// Commits are compared by `Oid`, which is what makes two branches pointing
/// at the same commit "the same tip" for the classifier.
///
/// # Example
///
/// ```
/// use gitfleet::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a 40 or 64 character hex id.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid("object id must be hexadecimal".into()));
        }
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the full OID when `len` exceeds its length.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated full git reference name, e.g. `refs/heads/main`.
///
/// # Example
///
/// ```
/// use gitfleet::core::types::{BranchName, RefName};
///
/// let branch = BranchName::new("feature/foo").unwrap();
/// let local = RefName::for_branch(&branch);
/// assert_eq!(local.as_str(), "refs/heads/feature/foo");
///
/// let tracking = RefName::for_remote_branch("origin", &branch).unwrap();
/// assert_eq!(tracking.as_str(), "refs/remotes/origin/feature/foo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.starts_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot start with '/'".into(),
            ));
        }
        check_refname_rules(&name)
            .map_err(|reason| TypeError::InvalidRefName(format!("ref name {reason}")))?;
        Ok(Self(name))
    }

    /// Ref name for a local branch (`refs/heads/<branch>`).
    pub fn for_branch(branch: &BranchName) -> Self {
        // Branch names are validated and the prefix is well-formed.
        Self(format!("refs/heads/{}", branch.as_str()))
    }

    /// Ref name for a remote-tracking branch (`refs/remotes/<remote>/<branch>`).
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if `remote` is not a valid
    /// path component.
    pub fn for_remote_branch(remote: &str, branch: &BranchName) -> Result<Self, TypeError> {
        Self::new(format!("refs/remotes/{}/{}", remote, branch.as_str()))
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

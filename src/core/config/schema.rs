//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the default remote must be a usable remote name,
//! the GitLab URL must be an http(s) URL).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::tips::TipPolicy;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// tip_policy = "commit"
/// remote = "origin"
///
/// [author]
/// name = "Jane Doe"
/// email = "jane@example.com"
///
/// [gitlab]
/// url = "https://gitlab.example.com"
/// token = "glpat-..."
/// https = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// How heads sharing a commit are compared by `tips` and `prune`
    pub tip_policy: Option<TipPolicy>,

    /// Remote rewritten by `remote` (default: "origin")
    pub remote: Option<String>,

    /// Identity written by `author`
    pub author: Option<AuthorConfig>,

    /// GitLab server used by `clone`
    pub gitlab: Option<GitLabConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(remote) = &self.remote {
            validate_remote_name(remote)?;
        }

        if let Some(author) = &self.author {
            author.validate()?;
        }

        if let Some(gitlab) = &self.gitlab {
            gitlab.validate()?;
        }

        Ok(())
    }
}

/// Check that a string can name a git remote.
pub fn validate_remote_name(remote: &str) -> Result<(), ConfigError> {
    if remote.is_empty() {
        return Err(ConfigError::InvalidValue(
            "remote cannot be empty".to_string(),
        ));
    }
    if remote.contains(char::is_whitespace) || remote.contains('/') {
        return Err(ConfigError::InvalidValue(format!(
            "invalid remote name '{}'",
            remote
        )));
    }
    Ok(())
}

/// Author identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    /// Value for `user.name`
    pub name: Option<String>,

    /// Value for `user.email`
    pub email: Option<String>,
}

impl AuthorConfig {
    /// Validate the author identity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "author name cannot be empty".to_string(),
                ));
            }
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid author email '{}'",
                    email
                )));
            }
        }
        Ok(())
    }
}

/// GitLab server settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitLabConfig {
    /// Base URL of the GitLab instance
    pub url: Option<String>,

    /// Personal access token
    pub token: Option<String>,

    /// Clone over HTTPS instead of SSH
    pub https: Option<bool>,
}

impl GitLabConfig {
    /// Validate the GitLab settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "gitlab url '{}' must start with http:// or https://",
                    url
                )));
            }
        }
        Ok(())
    }
}

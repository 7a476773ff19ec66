//! forge::traits
//!
//! Project source trait definition for listing repositories on a hosting
//! service.
//!
//! # Design
//!
//! The `ProjectSource` trait is async because listing involves network I/O.
//! Cloning is not part of the trait: sources only describe where projects
//! live, the git layer fetches them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from forge operations.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// A project (repository) hosted on a forge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Numeric project id
    pub id: u64,
    /// Namespaced path, e.g. `group/subgroup/project`
    pub path_with_namespace: String,
    /// SSH clone URL
    pub ssh_url_to_repo: String,
    /// HTTPS clone URL
    pub http_url_to_repo: String,
}

impl Project {
    /// Clone URL for the chosen transport.
    ///
    /// # Example
    ///
    /// ```
    /// use gitfleet::forge::Project;
    ///
    /// let project = Project {
    ///     id: 7,
    ///     path_with_namespace: "infra/tools".to_string(),
    ///     ssh_url_to_repo: "git@gitlab.example.com:infra/tools.git".to_string(),
    ///     http_url_to_repo: "https://gitlab.example.com/infra/tools.git".to_string(),
    /// };
    /// assert_eq!(project.clone_url(false), "git@gitlab.example.com:infra/tools.git");
    /// assert_eq!(project.clone_url(true), "https://gitlab.example.com/infra/tools.git");
    /// ```
    pub fn clone_url(&self, https: bool) -> &str {
        if https {
            &self.http_url_to_repo
        } else {
            &self.ssh_url_to_repo
        }
    }
}

/// A hosting service that can enumerate the projects visible to the user.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Short provider name, e.g. "gitlab".
    fn name(&self) -> &'static str;

    /// Every project the authenticated user is a member of, across all pages.
    async fn list_projects(&self) -> Result<Vec<Project>, ForgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_deserializes_from_api_shape() {
        let json = r#"{
            "id": 42,
            "name": "tools",
            "path_with_namespace": "infra/tools",
            "ssh_url_to_repo": "git@gitlab.example.com:infra/tools.git",
            "http_url_to_repo": "https://gitlab.example.com/infra/tools.git",
            "web_url": "https://gitlab.example.com/infra/tools"
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id, 42);
        assert_eq!(project.path_with_namespace, "infra/tools");
    }

    #[test]
    fn error_display() {
        let err = ForgeError::ApiError {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");
        assert_eq!(ForgeError::RateLimited.to_string(), "rate limited");
    }
}

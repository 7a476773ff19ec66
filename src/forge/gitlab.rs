//! forge::gitlab
//!
//! GitLab project listing over the REST API (v4).
//!
//! # Design
//!
//! Projects are listed with `GET /api/v4/projects?membership=true&simple=true`,
//! 100 per page, authenticated with a personal access token sent in the
//! `PRIVATE-TOKEN` header. Paging follows the `X-Next-Page` header when the
//! server sends it and otherwise stops at the first short page.
//!
//! # Example
//!
//! ```ignore
//! use gitfleet::forge::gitlab::GitLabSource;
//! use gitfleet::forge::ProjectSource;
//!
//! let source = GitLabSource::new("https://gitlab.example.com", "glpat-xxx")?;
//! for project in source.list_projects().await? {
//!     println!("{}", project.path_with_namespace);
//! }
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use super::traits::{ForgeError, Project, ProjectSource};

/// Projects requested per page (GitLab's maximum).
const PER_PAGE: usize = 100;

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "gitfleet";

/// Header carrying the personal access token.
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// GitLab project source.
pub struct GitLabSource {
    /// HTTP client for making requests
    client: Client,
    /// Personal access token
    token: String,
    /// Server base URL, without trailing slash
    base_url: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitLabSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabSource")
            .field("base_url", &self.base_url)
            .field("has_token", &!self.token.is_empty())
            .finish()
    }
}

impl GitLabSource {
    /// Create a source for the GitLab instance at `base_url`.
    ///
    /// # Errors
    ///
    /// - [`ForgeError::AuthRequired`] if `token` is empty
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ForgeError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ForgeError::AuthRequired);
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::new(),
            token,
            base_url,
        })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of one page of the project listing.
    fn projects_url(&self, page: u32) -> String {
        format!(
            "{}/api/v4/projects?membership=true&simple=true&per_page={}&page={}",
            self.base_url, PER_PAGE, page
        )
    }

    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        let token = HeaderValue::from_str(&self.token)
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(TOKEN_HEADER, token);
        Ok(headers)
    }

    /// Fetch one page, returning its projects and the next page number.
    async fn fetch_page(&self, page: u32) -> Result<(Vec<Project>, Option<u32>), ForgeError> {
        let url = self.projects_url(page);
        tracing::debug!(%url, "listing gitlab projects");

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let next_header = response
            .headers()
            .get("x-next-page")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string());

        let projects: Vec<Project> = self.handle_response(response).await?;

        let next = match next_header {
            Some(value) if value.is_empty() => None,
            Some(value) => value.parse().ok(),
            None if projects.len() < PER_PAGE => None,
            None => Some(page + 1),
        };

        Ok((projects, next))
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Err(Self::error_for_status(status, response).await)
        }
    }

    /// Map an error response to a [`ForgeError`].
    async fn error_for_status(status: StatusCode, response: Response) -> ForgeError {
        let message = match response.json::<GitLabErrorResponse>().await {
            Ok(body) => body.describe(),
            Err(_) => "Unknown error".to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => ForgeError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitLab server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl ProjectSource for GitLabSource {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ForgeError> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let (projects, next) = self.fetch_page(page).await?;
            let count = projects.len();
            all.extend(projects);

            match next {
                Some(next) if count > 0 && next > page => page = next,
                _ => break,
            }
        }

        tracing::info!(count = all.len(), base_url = %self.base_url, "listed gitlab projects");
        Ok(all)
    }
}

/// Error body returned by GitLab.
///
/// `message` is a string for most errors and an object of field errors for
/// validation failures; OAuth failures use `error` instead.
#[derive(Debug, Deserialize)]
struct GitLabErrorResponse {
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl GitLabErrorResponse {
    fn describe(&self) -> String {
        match (&self.message, &self.error) {
            (Some(serde_json::Value::String(s)), _) => s.clone(),
            (Some(other), _) => other.to_string(),
            (None, Some(error)) => error.clone(),
            (None, None) => "Unknown error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_rejected() {
        assert!(matches!(
            GitLabSource::new("https://gitlab.com", ""),
            Err(ForgeError::AuthRequired)
        ));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let source = GitLabSource::new("https://gitlab.example.com/", "t").unwrap();
        assert_eq!(source.base_url(), "https://gitlab.example.com");
        assert_eq!(
            source.projects_url(3),
            "https://gitlab.example.com/api/v4/projects?membership=true&simple=true&per_page=100&page=3"
        );
    }

    #[test]
    fn debug_hides_token() {
        let source = GitLabSource::new("https://gitlab.com", "glpat-secret").unwrap();
        let debug = format!("{:?}", source);
        assert!(!debug.contains("glpat-secret"));
        assert!(debug.contains("has_token"));
    }

    #[test]
    fn error_body_variants() {
        let plain: GitLabErrorResponse =
            serde_json::from_str(r#"{"message": "404 Project Not Found"}"#).unwrap();
        assert_eq!(plain.describe(), "404 Project Not Found");

        let nested: GitLabErrorResponse =
            serde_json::from_str(r#"{"message": {"name": ["is too short"]}}"#).unwrap();
        assert!(nested.describe().contains("is too short"));

        let oauth: GitLabErrorResponse =
            serde_json::from_str(r#"{"error": "invalid_token"}"#).unwrap();
        assert_eq!(oauth.describe(), "invalid_token");
    }
}

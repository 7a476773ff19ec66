//! forge::mock
//!
//! Mock project source for deterministic testing.
//!
//! # Example
//!
//! ```
//! use gitfleet::forge::mock::MockSource;
//! use gitfleet::forge::{Project, ProjectSource};
//!
//! let source = MockSource::with_projects(vec![Project {
//!     id: 1,
//!     path_with_namespace: "team/app".to_string(),
//!     ssh_url_to_repo: "git@example.com:team/app.git".to_string(),
//!     http_url_to_repo: "https://example.com/team/app.git".to_string(),
//! }]);
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let projects = runtime.block_on(source.list_projects()).unwrap();
//! assert_eq!(projects.len(), 1);
//! assert_eq!(source.list_calls(), 1);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::traits::{ForgeError, Project, ProjectSource};

/// In-memory project source.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    inner: Arc<Mutex<MockSourceInner>>,
}

#[derive(Debug, Default)]
struct MockSourceInner {
    projects: Vec<Project>,
    fail_with: Option<ForgeError>,
    list_calls: usize,
}

impl MockSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source listing `projects`.
    pub fn with_projects(projects: Vec<Project>) -> Self {
        let source = Self::new();
        source.lock().projects = projects;
        source
    }

    /// Make every subsequent listing fail with `err`.
    pub fn fail_with(&self, err: ForgeError) {
        self.lock().fail_with = Some(err);
    }

    /// Number of `list_projects` calls so far.
    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    fn lock(&self) -> MutexGuard<'_, MockSourceInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ProjectSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ForgeError> {
        let mut inner = self.lock();
        inner.list_calls += 1;
        match &inner.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(inner.projects.clone()),
        }
    }
}

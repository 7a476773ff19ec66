//! forge
//!
//! Abstraction over hosting services that list projects to clone.
//!
//! # Modules
//!
//! - `traits`: Core `ProjectSource` trait and the `Project` type
//! - [`gitlab`]: GitLab implementation using the REST API (v4)
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use gitfleet::forge::{gitlab::GitLabSource, ProjectSource};
//!
//! let source = GitLabSource::new("https://gitlab.example.com", token)?;
//! let projects = source.list_projects().await?;
//! ```

pub mod gitlab;
pub mod mock;
mod traits;

pub use traits::*;

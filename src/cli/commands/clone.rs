//! clone command - Clone every GitLab project into a directory tree
//!
//! Projects are listed first (async, on a dedicated runtime), then cloned one
//! at a time. Like the walker, the clone loop isolates failures: one project
//! that fails to clone is reported and the loop moves on.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, bail, Context as _, Result};

use super::report_failure;
use crate::core::config::Config;
use crate::engine::{CandidateReport, Context, Outcome, SkipReason, WalkReport};
use crate::forge::gitlab::GitLabSource;
use crate::forge::{Project, ProjectSource};
use crate::git::Git;
use crate::ui::output;

/// Clone every project visible on the configured GitLab server into `path`.
pub fn clone(
    ctx: &Context,
    config: &Config,
    path: &Path,
    url: Option<String>,
    token: Option<String>,
    https: bool,
) -> Result<()> {
    let url = url
        .or_else(|| config.gitlab_url().map(String::from))
        .context("No GitLab URL configured; pass --url or set GITLAB_URL")?;
    let token = token
        .or_else(|| config.gitlab_token().map(String::from))
        .context("No GitLab token configured; pass --token or set GITLAB_TOKEN")?;
    let https = https || config.gitlab_https();

    let source = GitLabSource::new(url, token)?;
    let projects = list_projects(&source)?;
    if projects.is_empty() {
        output::warn(
            format!("No projects visible on {} with this token", source.base_url()),
            ctx.verbosity(),
        );
        return Ok(());
    }
    output::note(
        format!("{} projects on {}", projects.len(), source.base_url()),
        ctx.verbosity(),
    );

    let dest = std::path::absolute(path)
        .with_context(|| format!("Invalid destination {}", path.display()))?;
    let report = clone_projects(&projects, &dest, https, |candidate| {
        report_failure(candidate);
        if candidate.outcome.is_processed() {
            output::print(format!("cloned {}", candidate.path.display()), ctx.verbosity());
        }
    });

    output::note(report.summary(), ctx.verbosity());
    Ok(())
}

/// List projects, blocking on a fresh runtime.
fn list_projects(source: &dyn ProjectSource) -> Result<Vec<Project>> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime
        .block_on(source.list_projects())
        .with_context(|| format!("Failed to list {} projects", source.name()))
}

/// Clone each project into `dest/<path_with_namespace>`.
///
/// Existing destinations are skipped. A failed clone is recorded and the
/// loop continues.
pub fn clone_projects<F>(
    projects: &[Project],
    dest: &Path,
    https: bool,
    mut on_outcome: F,
) -> WalkReport
where
    F: FnMut(&CandidateReport),
{
    let mut report = WalkReport::new();

    for project in projects {
        let candidate = match destination(dest, project) {
            Ok(target) => {
                let outcome = clone_one(project, &target, https);
                CandidateReport::new(target, outcome)
            }
            Err(err) => CandidateReport::new(dest.to_path_buf(), Outcome::Failed(err)),
        };

        on_outcome(&candidate);
        report.push(candidate);
    }

    report
}

/// Destination of `project` under `dest`.
///
/// Rejects namespaced paths that would escape `dest`.
fn destination(dest: &Path, project: &Project) -> Result<PathBuf> {
    let relative = Path::new(&project.path_with_namespace);
    if relative.as_os_str().is_empty()
        || !relative.components().all(|c| matches!(c, Component::Normal(_)))
    {
        bail!(
            "Refusing project {} with unsafe path '{}'",
            project.id,
            project.path_with_namespace
        );
    }
    Ok(dest.join(relative))
}

fn clone_one(project: &Project, target: &Path, https: bool) -> Outcome {
    if target.exists() {
        tracing::debug!(path = %target.display(), "destination exists, skipping");
        return Outcome::Skipped(SkipReason::AlreadyExists);
    }

    let url = project.clone_url(https);
    tracing::info!(%url, path = %target.display(), "cloning");

    let result = target
        .parent()
        .ok_or_else(|| anyhow!("No parent directory for {}", target.display()))
        .and_then(|parent| {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))
        })
        .and_then(|()| {
            Git::clone_into(url, target).with_context(|| format!("Failed to clone {}", url))
        });

    match result {
        Ok(()) => Outcome::Processed,
        Err(err) => {
            tracing::warn!(path = %target.display(), error = %err, "clone failed");
            Outcome::Failed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::MockSource;
    use crate::forge::ForgeError;
    use tempfile::TempDir;

    fn project(id: u64, path: &str) -> Project {
        Project {
            id,
            path_with_namespace: path.to_string(),
            ssh_url_to_repo: format!("git@example.invalid:{}.git", path),
            http_url_to_repo: format!("https://example.invalid/{}.git", path),
        }
    }

    #[test]
    fn listing_returns_source_projects() {
        let listed = vec![project(1, "team/app"), project(2, "ops/infra")];
        let source = MockSource::with_projects(listed.clone());

        let projects = list_projects(&source).unwrap();

        assert_eq!(projects, listed);
        assert_eq!(source.list_calls(), 1);
    }

    #[test]
    fn listing_failure_names_the_source() {
        let source = MockSource::with_projects(vec![project(1, "team/app")]);
        source.fail_with(ForgeError::AuthFailed("401 Unauthorized".into()));

        let err = list_projects(&source).unwrap_err();

        assert_eq!(err.to_string(), "Failed to list mock projects");
        assert!(format!("{:#}", err).contains("authentication failed: 401 Unauthorized"));
    }

    #[test]
    fn destination_joins_namespace() {
        let dest = destination(Path::new("/work"), &project(1, "infra/tools")).unwrap();
        assert_eq!(dest, PathBuf::from("/work/infra/tools"));
    }

    #[test]
    fn escaping_paths_rejected() {
        for bad in ["../etc", "/abs/path", "a/../../b", ""] {
            assert!(
                destination(Path::new("/work"), &project(1, bad)).is_err(),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn existing_destination_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("team/app")).unwrap();

        let mut seen = Vec::new();
        let report = clone_projects(&[project(1, "team/app")], temp.path(), false, |c| {
            seen.push(c.path.clone())
        });

        assert_eq!(seen, vec![temp.path().join("team/app")]);
        assert_eq!(report.skipped(Some(SkipReason::AlreadyExists)), 1);
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn unsafe_project_fails_without_stopping() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("team/app")).unwrap();

        let projects = [project(1, "../escape"), project(2, "team/app")];
        let report = clone_projects(&projects, temp.path(), false, |_| {});

        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(Some(SkipReason::AlreadyExists)), 1);
        assert!(!temp.path().parent().unwrap().join("escape").exists());
    }
}

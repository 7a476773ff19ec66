//! Integration tests for the repository walker.
//!
//! Each test builds a small directory tree with real repositories and checks
//! which candidates the operation hook sees and what the report records.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::bail;
use tempfile::TempDir;

use gitfleet::cli::commands::{PruneOperation, TipsOperation};
use gitfleet::core::tips::TipPolicy;
use gitfleet::engine::{Outcome, RepoOperation, RepoWalker, SkipReason};
use gitfleet::git::Git;
use gitfleet::ui::output::Verbosity;

/// Records every path it is called with; fails for configured names.
#[derive(Default)]
struct Recorder {
    calls: Vec<PathBuf>,
    fail_on: Vec<&'static str>,
}

impl Recorder {
    fn failing_on(names: &[&'static str]) -> Self {
        Self {
            calls: Vec::new(),
            fail_on: names.to_vec(),
        }
    }

    fn call_counts(&self) -> HashMap<PathBuf, usize> {
        let mut counts = HashMap::new();
        for path in &self.calls {
            *counts.entry(path.clone()).or_insert(0) += 1;
        }
        counts
    }
}

impl RepoOperation for Recorder {
    fn name(&self) -> &str {
        "record"
    }

    fn process(&mut self, _git: &Git, path: &Path) -> anyhow::Result<()> {
        self.calls.push(path.to_path_buf());
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if self.fail_on.contains(&name) {
            bail!("hook failed for {}", name);
        }
        Ok(())
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Create a working repository with one commit at `root/rel`.
fn make_repo(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(&path).unwrap();
    run_git(&path, &["init", "-q", "-b", "main"]);
    run_git(&path, &["config", "user.email", "test@example.com"]);
    run_git(&path, &["config", "user.name", "Test User"]);
    run_git(&path, &["config", "commit.gpgsign", "false"]);
    std::fs::write(path.join("file.txt"), rel).unwrap();
    run_git(&path, &["add", "file.txt"]);
    run_git(&path, &["commit", "-q", "-m", "init"]);
    path
}

fn make_bare(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(&path).unwrap();
    run_git(&path, &["init", "-q", "--bare"]);
    path
}

/// Canonical temp root, so walker paths compare equal on systems where the
/// temp directory is behind a symlink.
fn temp_root() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    (dir, root)
}

// =============================================================================
// Skips
// =============================================================================

#[test]
fn plain_directories_are_skipped_silently() {
    let (_dir, root) = temp_root();
    std::fs::create_dir_all(root.join("docs/notes")).unwrap();
    std::fs::write(root.join("docs/readme.txt"), "hi").unwrap();

    let mut op = Recorder::default();
    let report = RepoWalker::new(&root).run(&mut op);

    assert!(op.calls.is_empty());
    assert_eq!(report.failed(), 0);
    assert_eq!(report.processed(), 0);
    assert_eq!(report.skipped(Some(SkipReason::NotARepository)), 3);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn bare_repositories_are_skipped() {
    let (_dir, root) = temp_root();
    let bare = make_bare(&root, "mirror.git");
    let repo = make_repo(&root, "work");

    let mut op = Recorder::default();
    let report = RepoWalker::new(&root).run(&mut op);

    assert_eq!(op.calls, vec![repo]);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.skipped(Some(SkipReason::Bare)), 1);

    let bare_outcome = report
        .candidates()
        .iter()
        .find(|c| c.path == bare)
        .map(|c| c.outcome.skip_reason());
    assert_eq!(bare_outcome, Some(Some(SkipReason::Bare)));
}

// =============================================================================
// Failure isolation
// =============================================================================

#[test]
fn failing_hook_does_not_stop_the_walk() {
    let (_dir, root) = temp_root();
    let repos: Vec<_> = ["a", "b", "c", "d"]
        .iter()
        .map(|name| make_repo(&root, name))
        .collect();

    let mut op = Recorder::failing_on(&["b"]);
    let report = RepoWalker::new(&root).run(&mut op);

    let counts = op.call_counts();
    for repo in &repos {
        assert_eq!(counts.get(repo), Some(&1), "{}", repo.display());
    }
    assert_eq!(report.processed(), 3);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.exit_code(), 0);

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.path, repos[1]);
    let text = failure.failure_report().unwrap();
    assert!(text.starts_with(&format!("Error while processing {}:", repos[1].display())));
    assert!(text.contains("hook failed for b"));
}

#[test]
fn several_failures_are_all_recorded() {
    let (_dir, root) = temp_root();
    for name in ["a", "b", "c"] {
        make_repo(&root, name);
    }

    let mut op = Recorder::failing_on(&["a", "c"]);
    let report = RepoWalker::new(&root).run(&mut op);

    assert_eq!(op.calls.len(), 3);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.processed(), 1);
    assert_eq!(report.summary(), "1 repository processed, 2 failed");
}

#[test]
fn missing_start_path_is_a_failure() {
    let (_dir, root) = temp_root();
    let missing = root.join("does-not-exist");

    let mut op = Recorder::default();
    let report = RepoWalker::new(&missing).run(&mut op);

    assert!(op.calls.is_empty());
    assert_eq!(report.failed(), 1);
    assert_eq!(report.exit_code(), 0);
}

fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

/// A repository whose `side` branch has a missing parent commit: the branch
/// itself resolves, but walking its history fails.
fn repo_with_missing_history(root: &Path, rel: &str) -> PathBuf {
    let path = make_repo(root, rel);
    run_git(&path, &["checkout", "-q", "-b", "side"]);
    for name in ["s1", "s2"] {
        std::fs::write(path.join(name), name).unwrap();
        run_git(&path, &["add", name]);
        run_git(&path, &["commit", "-q", "-m", name]);
    }
    run_git(&path, &["checkout", "-q", "main"]);

    let lost = git_stdout(&path, &["rev-parse", "side~1"]);
    std::fs::remove_file(path.join(".git/objects").join(&lost[..2]).join(&lost[2..])).unwrap();
    path
}

#[test]
fn history_failure_fails_only_its_repository() {
    let (_dir, root) = temp_root();
    let broken = repo_with_missing_history(&root, "broken");
    let healthy = make_repo(&root, "healthy");
    run_git(&healthy, &["branch", "copy"]);

    let mut op = TipsOperation::new(TipPolicy::Commit, false, true, Verbosity::Quiet);
    let report = RepoWalker::new(&root).run(&mut op);

    assert_eq!(report.failed(), 1);
    assert_eq!(report.processed(), 1);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.processed_paths(), vec![healthy.as_path()]);

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.path, broken);
    assert!(failure
        .failure_report()
        .unwrap()
        .contains("Failed to classify branches"));

    assert_eq!(op.results().len(), 1);
    assert_eq!(op.results()[0].path, healthy);
}

#[test]
fn history_failure_stops_prune_before_deleting() {
    let (_dir, root) = temp_root();
    let broken = repo_with_missing_history(&root, "broken");
    run_git(&broken, &["branch", "old"]);
    let healthy = make_repo(&root, "healthy");
    run_git(&healthy, &["checkout", "-q", "-b", "next"]);
    std::fs::write(healthy.join("next.txt"), "next").unwrap();
    run_git(&healthy, &["add", "next.txt"]);
    run_git(&healthy, &["commit", "-q", "-m", "next"]);

    let mut op = PruneOperation::new(TipPolicy::Commit, false, Verbosity::Quiet);
    let report = RepoWalker::new(&root).run(&mut op);

    assert_eq!(report.failed(), 1);
    assert_eq!(report.processed(), 1);
    assert_eq!(report.exit_code(), 0);
    // `main` in the healthy repository is subsumed by the checked-out `next`.
    let deleted: Vec<_> = op.deleted().iter().map(|b| b.as_str()).collect();
    assert_eq!(deleted, vec!["main"]);
    assert!(git_stdout(&broken, &["branch", "--list", "old"]).contains("old"));
}

// =============================================================================
// Traversal
// =============================================================================

#[test]
fn traversal_is_depth_first_and_sorted() {
    let (_dir, root) = temp_root();
    let b = make_repo(&root, "b");
    let a_inner = make_repo(&root, "a/inner");
    let a_z = make_repo(&root, "a/z");
    let c = make_repo(&root, "c");

    let mut op = Recorder::default();
    RepoWalker::new(&root).run(&mut op);

    assert_eq!(op.calls, vec![a_inner, a_z, b, c]);
}

#[test]
fn nested_repositories_are_visited() {
    let (_dir, root) = temp_root();
    let outer = make_repo(&root, "outer");
    let inner = make_repo(&root, "outer/vendor/inner");

    let mut op = Recorder::default();
    RepoWalker::new(&root).run(&mut op);

    assert_eq!(op.calls, vec![outer, inner]);
}

#[test]
fn git_directories_are_never_candidates() {
    let (_dir, root) = temp_root();
    make_repo(&root, "repo");

    let mut seen = Vec::new();
    let mut op = Recorder::default();
    RepoWalker::new(&root).run_with(&mut op, |c| seen.push(c.path.clone()));

    assert!(!seen.is_empty());
    assert!(seen
        .iter()
        .all(|path| !path.components().any(|part| part.as_os_str() == ".git")));
    assert_eq!(op.calls.len(), 1);
}

#[test]
fn start_path_can_be_a_repository() {
    let (_dir, root) = temp_root();
    let repo = make_repo(&root, "single");

    let mut op = Recorder::default();
    let report = RepoWalker::new(&repo).run(&mut op);

    assert_eq!(op.calls, vec![repo.clone()]);
    assert_eq!(report.candidates()[0].path, repo);
    assert!(matches!(report.candidates()[0].outcome, Outcome::Processed));
}

#[cfg(unix)]
#[test]
fn symlinked_repository_is_visited_but_not_descended() {
    let (_dir, root) = temp_root();
    let real = make_repo(&root, "real");
    make_repo(&root, "real/nested");
    let link = root.join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let mut op = Recorder::default();
    RepoWalker::new(&root).run(&mut op);

    let counts = op.call_counts();
    assert_eq!(counts.get(&link), Some(&1));
    assert!(!counts.contains_key(&link.join("nested")));
    assert_eq!(counts.get(&real.join("nested")), Some(&1));
}

#[test]
fn run_with_reports_outcomes_in_walk_order() {
    let (_dir, root) = temp_root();
    make_repo(&root, "one");
    make_repo(&root, "two");

    let mut seen = Vec::new();
    let mut op = Recorder::default();
    let report = RepoWalker::new(&root).run_with(&mut op, |c| seen.push(c.path.clone()));

    // The callback sees every directory; the report keeps only repositories.
    assert_eq!(seen, vec![root.clone(), root.join("one"), root.join("two")]);
    let reported: Vec<_> = report.candidates().iter().map(|c| c.path.clone()).collect();
    assert_eq!(reported, vec![root.join("one"), root.join("two")]);
    assert_eq!(report.skipped(Some(SkipReason::NotARepository)), 1);
}

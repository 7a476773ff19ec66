//! tips command - List tip branches of every repository

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::run_walk;
use crate::core::tips::{classify, TipClassification, TipPolicy};
use crate::engine::{Context, RepoOperation};
use crate::git::Git;
use crate::ui::output::{self, Verbosity};

/// Classification of one repository's branches.
#[derive(Debug, Clone, Serialize)]
pub struct RepoTips {
    /// Repository path
    pub path: PathBuf,
    /// Every local branch, sorted by name
    pub branches: Vec<TipClassification>,
}

impl RepoTips {
    /// Names of the tip branches.
    pub fn tip_names(&self) -> Vec<&str> {
        self.branches
            .iter()
            .filter(|c| c.is_tip)
            .map(|c| c.head.name.as_str())
            .collect()
    }
}

/// Classifies the branches of each repository.
#[derive(Debug)]
pub struct TipsOperation {
    policy: TipPolicy,
    all: bool,
    /// Collect results instead of printing them
    collect: bool,
    verbosity: Verbosity,
    results: Vec<RepoTips>,
}

impl TipsOperation {
    pub fn new(policy: TipPolicy, all: bool, collect: bool, verbosity: Verbosity) -> Self {
        Self {
            policy,
            all,
            collect,
            verbosity,
            results: Vec::new(),
        }
    }

    /// Collected results, in walk order.
    pub fn results(&self) -> &[RepoTips] {
        &self.results
    }

    fn print(&self, tips: &RepoTips) {
        output::print(output::repo_header(&tips.path), self.verbosity);
        for class in &tips.branches {
            if class.is_tip {
                output::print(format!("  {}", class.head.name), self.verbosity);
            } else if self.all {
                output::print(
                    format!("  {} (subsumed, {})", class.head.name, class.head.oid.short(7)),
                    self.verbosity,
                );
            }
        }
    }
}

impl RepoOperation for TipsOperation {
    fn name(&self) -> &str {
        "tips"
    }

    fn process(&mut self, git: &Git, path: &Path) -> Result<()> {
        let heads = git.list_heads().context("Failed to list branches")?;
        if heads.is_empty() {
            return Ok(());
        }

        let branches = classify(git, &heads, self.policy).context("Failed to classify branches")?;
        let tips = RepoTips {
            path: path.to_path_buf(),
            branches,
        };

        if self.collect {
            self.results.push(tips);
        } else {
            self.print(&tips);
        }
        Ok(())
    }
}

/// List the tip branches of every repository under `path`.
pub fn tips(ctx: &Context, path: &Path, policy: TipPolicy, all: bool, json: bool) -> Result<()> {
    let mut op = TipsOperation::new(policy, all, json, ctx.verbosity());
    run_walk(ctx, path, &mut op);

    if json {
        let text = serde_json::to_string_pretty(op.results())
            .context("Failed to serialize results")?;
        println!("{}", text);
    }
    Ok(())
}

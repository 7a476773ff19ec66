//! core::tips
//!
//! Branch-tip classification.
//!
//! A local branch is a *tip* when its commit is not reachable from any other
//! branch's commit, i.e. no other branch already carries its history. The
//! `prune` operation deletes everything that is not a tip; `tips` lists them.
//!
//! # Algorithm
//!
//! 1. [`ancestor_sets`] computes, for every head, the set of commits reachable
//!    from it (inclusive of its own commit).
//! 2. [`is_tip`] checks a head's commit against every *other* head's set.
//!
//! Which pairs count as "other" is decided by [`TipPolicy`]. Under the
//! default [`TipPolicy::Commit`] two heads at the identical commit are
//! skipped, so `main` and `release` pointing at the same commit are both tips.
//! Under [`TipPolicy::Ref`] only the head itself is skipped, and such a pair
//! disqualify each other.
//!
//! # Invariants
//!
//! - Ancestor sets are recomputed on every call and never cached across calls
//! - A head is never disqualified by its own entry
//! - Errors from the commit graph propagate unchanged
//!
//! # Example
//!
//! ```ignore
//! use gitfleet::core::tips::{classify, TipPolicy};
//!
//! let heads = git.list_heads()?;
//! for c in classify(&git, &heads, TipPolicy::Commit)? {
//!     println!("{} {}", if c.is_tip { "tip " } else { "    " }, c.head.name);
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::types::{BranchName, Oid};
use crate::git::GitError;

/// Read access to a commit graph.
///
/// Implemented by [`crate::git::Git`]; tests use in-memory graphs.
pub trait CommitGraph {
    /// Parent OIDs of a commit. Empty for root commits.
    fn commit_parents(&self, oid: &Oid) -> Result<Vec<Oid>, GitError>;

    /// All commits reachable from `oid` by following parents, including `oid`.
    fn ancestors(&self, oid: &Oid) -> Result<HashSet<Oid>, GitError> {
        let mut seen = HashSet::new();
        let mut pending = vec![oid.clone()];

        while let Some(next) = pending.pop() {
            if seen.contains(&next) {
                continue;
            }
            let parents = self.commit_parents(&next)?;
            seen.insert(next);
            pending.extend(parents.into_iter().filter(|p| !seen.contains(p)));
        }

        Ok(seen)
    }
}

/// A local branch and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Head {
    /// Branch name, unique within one repository
    pub name: BranchName,
    /// Commit the branch points at
    pub oid: Oid,
}

impl Head {
    /// Create a new head.
    pub fn new(name: BranchName, oid: Oid) -> Self {
        Self { name, oid }
    }
}

/// Which pairs of heads are compared during classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipPolicy {
    /// Skip every head whose commit equals the candidate's commit.
    #[default]
    Commit,
    /// Skip only the candidate itself (comparison by branch name).
    Ref,
}

impl TipPolicy {
    /// Valid policy names, as accepted by [`FromStr`].
    pub const NAMES: &'static [&'static str] = &["commit", "ref"];

    /// The policy's name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TipPolicy::Commit => "commit",
            TipPolicy::Ref => "ref",
        }
    }
}

impl FromStr for TipPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(TipPolicy::Commit),
            "ref" => Ok(TipPolicy::Ref),
            other => Err(format!(
                "invalid tip policy '{}', must be one of: {}",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl std::fmt::Display for TipPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One head's commit and everything reachable from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorEntry {
    /// The head's commit
    pub tip: Oid,
    /// Commits reachable from `tip`, including `tip`
    pub ancestors: HashSet<Oid>,
}

/// Ancestor sets for all heads of one repository, keyed by branch name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorSets {
    entries: BTreeMap<BranchName, AncestorEntry>,
}

impl AncestorSets {
    /// The entry for a branch, if it was part of the computation.
    pub fn get(&self, name: &BranchName) -> Option<&AncestorEntry> {
        self.entries.get(name)
    }

    /// Iterate entries in branch-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&BranchName, &AncestorEntry)> {
        self.entries.iter()
    }

    /// Number of heads.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no heads were given.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Classification result for one head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TipClassification {
    /// The classified head
    #[serde(flatten)]
    pub head: Head,
    /// Whether the head is a tip
    pub is_tip: bool,
}

/// Compute the ancestor set of every head.
///
/// `heads` must be the complete set of local branches; classifications
/// computed from a subset are only valid relative to that subset.
///
/// # Errors
///
/// Any error from the commit graph (missing or corrupt objects).
pub fn ancestor_sets<G>(graph: &G, heads: &[Head]) -> Result<AncestorSets, GitError>
where
    G: CommitGraph + ?Sized,
{
    // Heads sharing a commit share a walk within this call only.
    let mut walked: HashMap<&Oid, HashSet<Oid>> = HashMap::new();
    let mut entries = BTreeMap::new();

    for head in heads {
        let ancestors = match walked.get(&head.oid) {
            Some(set) => set.clone(),
            None => {
                let set = graph.ancestors(&head.oid)?;
                walked.insert(&head.oid, set.clone());
                set
            }
        };
        entries.insert(
            head.name.clone(),
            AncestorEntry {
                tip: head.oid.clone(),
                ancestors,
            },
        );
    }

    Ok(AncestorSets { entries })
}

/// Whether `head` is a tip relative to `sets`.
///
/// `head` is a tip iff no compared head's ancestor set contains `head`'s
/// commit. Which heads are compared is decided by `policy`.
pub fn is_tip(head: &Head, sets: &AncestorSets, policy: TipPolicy) -> bool {
    sets.iter().all(|(name, other)| {
        let skipped = match policy {
            TipPolicy::Commit => other.tip == head.oid,
            TipPolicy::Ref => *name == head.name,
        };
        skipped || !other.ancestors.contains(&head.oid)
    })
}

/// Classify every head, sorted by branch name.
///
/// # Errors
///
/// Any error from the commit graph.
pub fn classify<G>(
    graph: &G,
    heads: &[Head],
    policy: TipPolicy,
) -> Result<Vec<TipClassification>, GitError>
where
    G: CommitGraph + ?Sized,
{
    let sets = ancestor_sets(graph, heads)?;

    let mut result: Vec<_> = heads
        .iter()
        .map(|head| TipClassification {
            head: head.clone(),
            is_tip: is_tip(head, &sets, policy),
        })
        .collect();
    result.sort_by(|a, b| a.head.name.cmp(&b.head.name));

    Ok(result)
}

/// Non-tip heads that can be deleted without losing a commit, sorted by
/// branch name.
///
/// A head reached by a head at a *different* commit is always removable.
/// Under [`TipPolicy::Ref`] heads sharing a commit disqualify each other
/// even when nothing else reaches that commit; one head of each such group
/// survives: `keep` when it points at the group's commit, otherwise the
/// first name. `keep` (the checked-out branch) is never returned.
pub fn removable(
    heads: &[Head],
    sets: &AncestorSets,
    policy: TipPolicy,
    keep: Option<&BranchName>,
) -> Vec<Head> {
    let kept_oid = keep.and_then(|name| sets.get(name)).map(|entry| &entry.tip);

    let mut result = Vec::new();
    let mut stranded: BTreeMap<&Oid, Vec<&Head>> = BTreeMap::new();
    for head in heads {
        if keep == Some(&head.name) || is_tip(head, sets, policy) {
            continue;
        }
        if is_tip(head, sets, TipPolicy::Commit) {
            stranded.entry(&head.oid).or_default().push(head);
        } else {
            result.push(head.clone());
        }
    }

    for (oid, mut group) in stranded {
        group.sort_by(|a, b| a.name.cmp(&b.name));
        let survivors = if kept_oid == Some(oid) { 0 } else { 1 };
        result.extend(group.into_iter().skip(survivors).cloned());
    }

    result.sort_by(|a, b| a.name.cmp(&b.name));
    result
}

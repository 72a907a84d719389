// src/history.rs

use crate::error::{Error, Result};
use crate::model::RevisionPair;
use git2::{Commit, Delta, DiffFindOptions, DiffOptions, Oid, Repository, Sort};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Object id of the empty tree, used as the old side of a root commit
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// An opened repository, plus the temporary checkout backing it when it was cloned
pub struct Workspace {
    pub repo: Repository,
    pub label: String,
    _clone_dir: Option<TempDir>,
}

impl Workspace {
    /// Working directory the `git` binary should be pointed at
    pub fn path(&self) -> PathBuf {
        self.repo
            .workdir()
            .unwrap_or_else(|| self.repo.path())
            .to_path_buf()
    }
}

/// Opens a local repository, or clones anything that is not a directory into a temporary one.
pub fn open_or_clone(location: &str) -> Result<Workspace> {
    let label = repository_label(location);
    let local = Path::new(location);
    if local.is_dir() {
        let repo = Repository::open(local).map_err(|source| Error::Open { location: location.to_string(), source })?;
        return Ok(Workspace { repo, label, _clone_dir: None });
    }

    let dir = tempfile::Builder::new()
        .prefix("repo_clone_")
        .tempdir()
        .map_err(|source| Error::io("creating clone directory", source))?;
    tracing::info!(url = location, dest = %dir.path().display(), "cloning repository");
    let bar = ProgressBar::new_spinner();
    bar.set_message(format!("Cloning {location}"));
    bar.enable_steady_tick(std::time::Duration::from_millis(120));
    let repo = git2::build::RepoBuilder::new()
        .clone(location, dir.path())
        .map_err(|source| Error::Clone { url: location.to_string(), source })?;
    bar.finish_with_message("Clone complete");
    Ok(Workspace { repo, label, _clone_dir: Some(dir) })
}

/// Short name for a repository location, e.g. `flask` for `https://github.com/pallets/flask.git`
pub fn repository_label(location: &str) -> String {
    let trimmed = location.trim_end_matches(['/', '\\']);
    let last = trimmed.rsplit(['/', '\\', ':']).next().unwrap_or(trimmed);
    let label = last.strip_suffix(".git").unwrap_or(last);
    if label.is_empty() {
        location.to_string()
    } else {
        label.to_string()
    }
}

/// Collects one RevisionPair per modified text file, walking history oldest first.
///
/// `max_commits` of zero visits every commit reachable from HEAD.
pub fn revision_pairs(workspace: &Workspace, max_commits: usize) -> Result<Vec<RevisionPair>> {
    let repo = &workspace.repo;
    let walk_err = |source: git2::Error| Error::History { label: workspace.label.clone(), source };

    if let Err(e) = repo.head() {
        tracing::warn!(repository = %workspace.label, error = %e, "no commits reachable from HEAD");
        return Ok(Vec::new());
    }

    let mut revwalk = repo.revwalk().map_err(walk_err)?;
    revwalk.push_head().map_err(walk_err)?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE).map_err(walk_err)?;

    let mut commits = Vec::new();
    for oid in revwalk {
        match oid {
            Ok(oid) => commits.push(oid),
            Err(e) => tracing::warn!(repository = %workspace.label, error = %e, "skipping unreadable revwalk entry"),
        }
        if max_commits > 0 && commits.len() >= max_commits {
            break;
        }
    }

    let bar = ProgressBar::new(commits.len() as u64);
    bar.set_message(format!("Walking {}", workspace.label));

    let mut pairs = Vec::new();
    for oid in commits {
        let outcome = repo
            .find_commit(oid)
            .and_then(|commit| commit_pairs(repo, &commit, &workspace.label));
        match outcome {
            Ok(found) => pairs.extend(found),
            Err(e) => tracing::warn!(repository = %workspace.label, commit = %oid, error = %e, "skipping commit"),
        }
        bar.inc(1);
    }
    bar.finish_with_message(format!("{}: {} file modifications", workspace.label, pairs.len()));
    tracing::info!(repository = %workspace.label, pairs = pairs.len(), "history walk complete");

    Ok(pairs)
}

/// Returns `label`, or `label-2`, `label-3`, ... when it is already taken
pub fn unique_label(label: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(label) {
        return label.to_string();
    }
    (2..)
        .map(|n| format!("{label}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| label.to_string())
}

/// Pairs for one commit; nothing is returned unless the whole commit could be read
fn commit_pairs(repo: &Repository, commit: &Commit, label: &str) -> std::result::Result<Vec<RevisionPair>, git2::Error> {
    let parent = commit.parents().next();
    let parent_tree = parent.as_ref().map(Commit::tree).transpose()?;
    let current_tree = commit.tree()?;

    let mut diff_opts = DiffOptions::new();
    diff_opts.include_untracked(false);
    diff_opts.ignore_filemode(true);

    let mut diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&current_tree), Some(&mut diff_opts))?;
    diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

    let old_revision = parent.map_or_else(|| EMPTY_TREE.to_string(), |p| p.id().to_string());
    let new_revision = commit.id().to_string();
    let message = commit.summary().unwrap_or_default().to_string();
    let commit_time = commit.time().seconds();

    let mut pairs = Vec::new();
    for delta in diff.deltas() {
        if matches!(delta.status(), Delta::Unmodified | Delta::Ignored | Delta::Untracked) {
            continue;
        }
        let old_path = delta.old_file().path().and_then(|p| p.to_str()).map(String::from);
        let new_path = delta.new_file().path().and_then(|p| p.to_str()).map(String::from);
        let blob_id = if delta.status() == Delta::Deleted { delta.old_file().id() } else { delta.new_file().id() };
        if delta.flags().is_binary() || is_binary_blob(repo, blob_id) {
            continue;
        }
        let Some(file_path) = new_path.clone().or_else(|| old_path.clone()) else {
            continue;
        };

        pairs.push(RevisionPair {
            repository: label.to_string(),
            old_revision: old_revision.clone(),
            new_revision: new_revision.clone(),
            file_path,
            old_path: if delta.status() == Delta::Added { None } else { old_path },
            new_path: if delta.status() == Delta::Deleted { None } else { new_path },
            commit_time,
            message: message.clone(),
        });
    }
    Ok(pairs)
}

fn is_binary_blob(repo: &Repository, id: Oid) -> bool {
    !id.is_zero() && repo.find_blob(id).map(|blob| blob.is_binary()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_from_locations() {
        assert_eq!(repository_label("https://github.com/pallets/flask.git"), "flask");
        assert_eq!(repository_label("https://github.com/iovisor/bcc"), "bcc");
        assert_eq!(repository_label("/home/me/src/cilium/"), "cilium");
        assert_eq!(repository_label("git@github.com:cilium/cilium.git"), "cilium");
        assert_eq!(repository_label("."), ".");
    }

    #[test]
    fn duplicate_labels_get_a_suffix() {
        let mut taken = HashSet::new();
        assert_eq!(unique_label("flask", &taken), "flask");
        taken.insert("flask".to_string());
        assert_eq!(unique_label("flask", &taken), "flask-2");
        taken.insert("flask-2".to_string());
        assert_eq!(unique_label("flask", &taken), "flask-3");
        assert_eq!(unique_label("bcc", &taken), "bcc");
    }

    #[test]
    fn missing_local_path_is_not_opened() {
        assert!(open_or_clone("/definitely/not/a/repository/here").is_err());
    }
}

//! History walking and diffing against a real, throwaway git repository.

use git2::{Commit, Oid, Repository, Signature};
use git_diffcmp::config::RunConfig;
use git_diffcmp::history::{open_or_clone, revision_pairs, Workspace, EMPTY_TREE};
use git_diffcmp::model::{DiffAlgorithm, FileCategory};
use git_diffcmp::pipeline::run;
use git_diffcmp::runner::{DiffComputer, GitCli};
use std::fs;
use std::path::Path;

fn commit(repo: &Repository, files: &[(&str, &[u8])], message: &str) -> Oid {
    commit_changes(repo, files, &[], message)
}

fn commit_changes(repo: &Repository, files: &[(&str, &[u8])], removed: &[&str], message: &str) -> Oid {
    let workdir = repo.workdir().expect("non-bare repository");
    let mut index = repo.index().expect("index");
    for (path, content) in files {
        let full = workdir.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(&full, content).expect("write file");
        index.add_path(Path::new(path)).expect("stage file");
    }
    for path in removed {
        fs::remove_file(workdir.join(path)).expect("remove file");
        index.remove_path(Path::new(path)).expect("unstage file");
    }
    index.write().expect("write index");
    let tree = repo.find_tree(index.write_tree().expect("write tree")).expect("find tree");
    let sig = Signature::now("Test", "test@example.com").expect("signature");
    let parents: Vec<Commit> = repo
        .head()
        .ok()
        .and_then(|head| head.peel_to_commit().ok())
        .into_iter()
        .collect();
    let parent_refs: Vec<&Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .expect("commit")
}

fn fixture_repo(dir: &Path) -> (Oid, Oid) {
    let repo = Repository::init(dir).expect("init");
    let first = commit(
        &repo,
        &[
            ("src/app.py", b"def main():\n    print('hi')\n".as_slice()),
            ("README.md", b"# Demo\n".as_slice()),
            ("assets/logo.png", b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00".as_slice()),
        ],
        "Initial commit",
    );
    let second = commit(
        &repo,
        &[
            ("src/app.py", b"def main():\n    print('hello')\n    return 0\n".as_slice()),
            ("LICENSE", b"MIT License\n".as_slice()),
        ],
        "Say hello\n\nLonger body that is not part of the summary.",
    );
    (first, second)
}

fn open(dir: &Path) -> Workspace {
    open_or_clone(dir.to_str().expect("utf-8 path")).expect("open")
}

fn git_available() -> bool {
    GitCli::new(".").probe().is_ok()
}

#[test]
fn walks_history_oldest_first_and_skips_binaries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (first, second) = fixture_repo(dir.path());
    let workspace = open_or_clone(dir.path().to_str().expect("utf-8 path")).expect("open");

    let pairs = revision_pairs(&workspace, 0).expect("walk");
    let paths: Vec<_> = pairs.iter().map(|p| p.file_path.as_str()).collect();
    assert_eq!(paths, ["README.md", "src/app.py", "LICENSE", "src/app.py"]);

    assert!(pairs[..2].iter().all(|p| p.old_revision == EMPTY_TREE && p.new_revision == first.to_string()));
    assert!(pairs[..2].iter().all(|p| p.old_path.is_none()));
    assert!(pairs[2..].iter().all(|p| p.old_revision == first.to_string() && p.new_revision == second.to_string()));
    assert_eq!(pairs[3].message, "Say hello");
    assert_eq!(pairs[3].old_path.as_deref(), Some("src/app.py"));
}

#[test]
fn max_commits_limits_the_walk() {
    let dir = tempfile::tempdir().expect("tempdir");
    fixture_repo(dir.path());
    let workspace = open_or_clone(dir.path().to_str().expect("utf-8 path")).expect("open");
    let pairs = revision_pairs(&workspace, 1).expect("walk");
    assert_eq!(pairs.len(), 2);
}

#[test]
fn git_cli_diffs_every_pair() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    fixture_repo(dir.path());
    let workspace = open_or_clone(dir.path().to_str().expect("utf-8 path")).expect("open");
    let pairs = revision_pairs(&workspace, 0).expect("walk");
    let git = GitCli::new(workspace.path());

    let raw = git.compute(&pairs[3], DiffAlgorithm::Histogram);
    assert!(raw.as_str().contains("+    return 0"));

    let config = RunConfig::default();
    let output = run(&git, pairs, &config).expect("run");
    assert_eq!(output.records.len(), 4);
    assert!(output.records.iter().all(|r| !r.baseline.is_empty() && !r.candidate.is_empty()));

    let agg = &output.summary.overall;
    assert_eq!(agg.overall().total_count, 4);
    assert_eq!(agg.overall().disagreement_count, 0);
    assert_eq!(agg.category(FileCategory::Source).total_count, 2);
    assert_eq!(agg.category(FileCategory::License).total_count, 1);
    assert_eq!(agg.category(FileCategory::Readme).total_count, 1);
}

#[test]
fn deletions_and_renames_keep_both_sides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_, second) = fixture_repo(dir.path());
    let repo = Repository::open(dir.path()).expect("reopen");
    let third = commit_changes(
        &repo,
        &[("src/main.py", b"def main():\n    print('hello')\n    return 0\n".as_slice())],
        &["README.md", "src/app.py"],
        "Drop readme, rename app",
    );

    let workspace = open(dir.path());
    let pairs = revision_pairs(&workspace, 0).expect("walk");
    let latest: Vec<_> = pairs.iter().filter(|p| p.new_revision == third.to_string()).collect();
    assert_eq!(latest.len(), 2);
    assert!(latest.iter().all(|p| p.old_revision == second.to_string()));

    let deleted = latest.iter().find(|p| p.file_path == "README.md").expect("deleted file");
    assert_eq!(deleted.old_path.as_deref(), Some("README.md"));
    assert_eq!(deleted.new_path, None);

    let renamed = latest.iter().find(|p| p.file_path == "src/main.py").expect("renamed file");
    assert_eq!(renamed.old_path.as_deref(), Some("src/app.py"));
    assert_eq!(renamed.new_path.as_deref(), Some("src/main.py"));

    if git_available() {
        let raw = GitCli::new(workspace.path()).compute(deleted, DiffAlgorithm::Myers);
        assert!(raw.as_str().contains("-# Demo"), "deletion diff: {}", raw.as_str());
    }
}

#[test]
fn bracketed_paths_only_match_themselves() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = Repository::init(dir.path()).expect("init");
    commit(&repo, &[("[id].tsx", b"a\n".as_slice()), ("i.tsx", b"x\n".as_slice())], "Add routes");
    commit(&repo, &[("[id].tsx", b"b\n".as_slice()), ("i.tsx", b"y\n".as_slice())], "Edit routes");

    let workspace = open(dir.path());
    let pairs = revision_pairs(&workspace, 0).expect("walk");
    let pair = pairs.iter().rev().find(|p| p.file_path == "[id].tsx").expect("bracketed file");

    for algorithm in [DiffAlgorithm::Myers, DiffAlgorithm::Histogram] {
        let raw = GitCli::new(workspace.path()).compute(pair, algorithm);
        assert_eq!(raw.as_str().matches("diff --git").count(), 1, "{algorithm}: {}", raw.as_str());
        assert!(raw.as_str().contains("+b"));
        assert!(!raw.as_str().contains("i.tsx b/i.tsx"));
        assert!(!raw.as_str().contains("+y"));
    }
}

#[test]
fn empty_repository_has_no_pairs() {
    let dir = tempfile::tempdir().expect("tempdir");
    Repository::init(dir.path()).expect("init");
    let pairs = revision_pairs(&open(dir.path()), 0).expect("an empty history is not an error");
    assert!(pairs.is_empty());
}

#[test]
fn unreadable_commits_are_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = Repository::init(dir.path()).expect("init");
    let first = commit(&repo, &[("a.txt", b"one\n".as_slice())], "First");
    let second = commit(&repo, &[("a.txt", b"two\n".as_slice())], "Second");
    let third = commit(&repo, &[("a.txt", b"three\n".as_slice())], "Third");

    let tree = repo.find_commit(second).expect("second commit").tree_id().to_string();
    fs::remove_file(dir.path().join(".git/objects").join(&tree[..2]).join(&tree[2..])).expect("remove tree object");
    drop(repo);

    let pairs = revision_pairs(&open(dir.path()), 0).expect("damaged commits do not abort the walk");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].new_revision, first.to_string());
    assert!(pairs.iter().all(|p| p.new_revision != second.to_string() && p.new_revision != third.to_string()));
}

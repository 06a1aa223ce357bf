//! Integration tests for ferrodiff
//!
//! These tests build real directory trees, scan them and drive the diff,
//! duplicate, sync and hardlink components end to end.

use ferrodiff_config::ConfigBuilder;
use ferrodiff_index::{hash_bytes, FileHasher, ScanOptions, Scanner};
use ferrodiff_sync::{
    DiffEngine, DuplicateFinder, DuplicateSummary, ExecutorOptions, HardlinkPlanner,
    LinkExecutor, NoopObserver, SyncAction, SyncExecutor, SyncPlanner,
};
use ferrodiff_tests::{scan_roots, TestDataPattern, TreeBuilder};
use ferrodiff_types::{CollisionPolicy, Error, SyncDirection, SyncMode, WorkerCount};
use rstest::rstest;
use std::path::{Path, PathBuf};

/// A tree with a few nested files of different sizes
fn sample_tree() -> TreeBuilder {
    TreeBuilder::new()
        .data("small.txt", 1024, TestDataPattern::Seeded(1))
        .data("medium.bin", 64 * 1024, TestDataPattern::Seeded(2))
        .data("large.bin", 300 * 1024, TestDataPattern::Seeded(3))
        .data("subdir1/file1.txt", 2048, TestDataPattern::Seeded(4))
        .data("subdir2/file2.txt", 4096, TestDataPattern::Seeded(5))
        .data("subdir1/nested/file3.txt", 8192, TestDataPattern::Zeros)
}

#[tokio::test]
async fn test_digest_is_deterministic() {
    let tree = TreeBuilder::new().file("note.txt", "the same bytes");

    let hasher = FileHasher::default();
    let first = hasher.hash_file(&tree.join("note.txt")).await.unwrap();
    let second = hasher.hash_file(&tree.join("note.txt")).await.unwrap();

    assert_eq!(first.digest, second.digest);
    assert_eq!(first.digest, hash_bytes(b"the same bytes"));
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(16)]
#[tokio::test]
async fn test_index_independent_of_worker_count(#[case] workers: usize) {
    let tree = sample_tree();
    let reference = tree.scan().await;

    let options = ScanOptions::default().with_workers(WorkerCount::new(workers).unwrap());
    let index = scan_roots(&[tree.path()], options).await;

    assert_eq!(index.path_to_digest(), reference.path_to_digest());
    assert_eq!(index.digest_to_paths(), reference.digest_to_paths());
    assert_eq!(index.len(), 6);
}

#[tokio::test]
async fn test_identical_trees_have_empty_diff() {
    let a = sample_tree();
    let b = sample_tree();

    let diff = DiffEngine::compare(&a.scan().await, &b.scan().await);
    assert!(diff.is_empty());
}

#[tokio::test]
async fn test_moved_file_fires_both_lenses() {
    let a = TreeBuilder::new().file("x/a.txt", "payload");
    let b = TreeBuilder::new().file("y/a.txt", "payload");

    let diff = DiffEngine::compare(&a.scan().await, &b.scan().await);

    assert_eq!(diff.deletions.iter().collect::<Vec<_>>(), vec![Path::new("x/a.txt")]);
    assert_eq!(diff.additions.iter().collect::<Vec<_>>(), vec![Path::new("y/a.txt")]);
    assert!(diff.modifications.is_empty());
    assert_eq!(diff.relocation_count(), 1);

    let relocation = &diff.relocations[0];
    assert_eq!(relocation.digest, hash_bytes(b"payload"));
    assert_eq!(relocation.paths_in_a, vec![PathBuf::from("x/a.txt")]);
    assert_eq!(relocation.paths_in_b, vec![PathBuf::from("y/a.txt")]);
}

#[tokio::test]
async fn test_duplicate_group() {
    let tree = TreeBuilder::new()
        .file("a.txt", "twin")
        .file("b.txt", "twin")
        .file("c.txt", "single");

    let groups = DuplicateFinder::find(&tree.scan().await);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].digest, hash_bytes(b"twin"));
    assert_eq!(
        groups[0].paths,
        vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
    );

    let summary = DuplicateSummary::of(&groups);
    assert_eq!(summary.redundant_files, 1);
    assert_eq!(summary.reclaimable_bytes, 4);
}

#[tokio::test]
async fn test_scenario_diff_and_mirror_plan() {
    // A = {f1: H1, f2: H2}, B = {f2: H3, f3: H1}
    let a = TreeBuilder::new().file("f1", "H1").file("f2", "H2");
    let b = TreeBuilder::new().file("f2", "H3").file("f3", "H1");

    let index_a = a.scan().await;
    let index_b = b.scan().await;
    let diff = DiffEngine::compare(&index_a, &index_b);

    assert_eq!(diff.additions.iter().collect::<Vec<_>>(), vec![Path::new("f3")]);
    assert_eq!(diff.deletions.iter().collect::<Vec<_>>(), vec![Path::new("f1")]);
    assert_eq!(diff.modifications, vec![PathBuf::from("f2")]);
    assert_eq!(diff.relocation_count(), 1);
    assert_eq!(diff.relocations[0].digest, hash_bytes(b"H1"));
    assert_eq!(diff.relocations[0].paths_in_a, vec![PathBuf::from("f1")]);
    assert_eq!(diff.relocations[0].paths_in_b, vec![PathBuf::from("f3")]);

    let plan = SyncPlanner::plan(&diff, SyncMode::Mirror, SyncDirection::AToB);
    assert_eq!(
        plan.actions,
        vec![
            SyncAction::Copy(PathBuf::from("f1")),
            SyncAction::Copy(PathBuf::from("f2")),
            SyncAction::Delete(PathBuf::from("f3")),
        ]
    );

    let report = SyncExecutor::default()
        .execute(&plan, a.path(), b.path(), &NoopObserver)
        .await;
    assert!(report.is_success());
    assert_eq!(b.read("f1"), b"H1");
    assert_eq!(b.read("f2"), b"H2");
    assert!(!b.exists("f3"));
}

#[tokio::test]
async fn test_shared_content_diff_on_disk() {
    // A = {f1: "abc", f2: "xyz"}, B = {f1: "abc", f2: "xyz2", f3: "abc"}
    let a = TreeBuilder::new().file("f1", "abc").file("f2", "xyz");
    let b = TreeBuilder::new()
        .file("f1", "abc")
        .file("f2", "xyz2")
        .file("f3", "abc");

    let diff = DiffEngine::compare(&a.scan().await, &b.scan().await);

    assert_eq!(diff.additions.iter().collect::<Vec<_>>(), vec![Path::new("f3")]);
    assert!(diff.deletions.is_empty());
    assert_eq!(diff.modifications, vec![PathBuf::from("f2")]);

    assert_eq!(diff.relocation_count(), 1);
    let relocation = &diff.relocations[0];
    assert_eq!(relocation.digest, hash_bytes(b"abc"));
    assert_eq!(relocation.paths_in_a, vec![PathBuf::from("f1")]);
    assert_eq!(
        relocation.paths_in_b,
        vec![PathBuf::from("f1"), PathBuf::from("f3")]
    );
}

#[tokio::test]
async fn test_mirror_sync_converges() {
    let source = sample_tree();
    let target = TreeBuilder::new()
        .data("small.txt", 1024, TestDataPattern::Seeded(9))
        .file("stale/old.txt", "remove me")
        .file("extra.txt", "remove me too");

    let diff = DiffEngine::compare(&source.scan().await, &target.scan().await);
    let plan = SyncPlanner::plan(&diff, SyncMode::Mirror, SyncDirection::AToB);
    let report = SyncExecutor::default()
        .execute(&plan, source.path(), target.path(), &NoopObserver)
        .await;

    assert!(report.is_success());
    assert_eq!(report.copied.len(), 6);
    assert_eq!(report.deleted.len(), 2);

    let after = DiffEngine::compare(&source.scan().await, &target.scan().await);
    assert!(after.is_empty(), "trees differ after mirror: {after:?}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_mirror_after_dedup_only_touches_planned_paths() {
    let source = TreeBuilder::new()
        .file("a.txt", "changed")
        .file("b.txt", "same");
    let target = TreeBuilder::new().file("a.txt", "same").file("b.txt", "same");

    let target_index = target.scan().await;
    let actions = HardlinkPlanner::plan(&DuplicateFinder::find(&target_index));
    let linked = LinkExecutor::default()
        .execute(&target_index, &actions, &NoopObserver)
        .await;
    assert_eq!(linked.linked.len(), 1);

    let diff = DiffEngine::compare(&source.scan().await, &target.scan().await);
    let plan = SyncPlanner::plan(&diff, SyncMode::Mirror, SyncDirection::AToB);
    assert_eq!(plan.actions, vec![SyncAction::Copy(PathBuf::from("a.txt"))]);

    let report = SyncExecutor::default()
        .execute(&plan, source.path(), target.path(), &NoopObserver)
        .await;
    assert!(report.is_success());

    assert_eq!(target.read("a.txt"), b"changed");
    assert_eq!(target.read("b.txt"), b"same");
    let after = DiffEngine::compare(&source.scan().await, &target.scan().await);
    assert!(after.is_empty(), "trees differ after mirror: {after:?}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_mirror_keeps_target_of_unreadable_source() {
    use std::os::unix::fs::PermissionsExt;

    let source = TreeBuilder::new()
        .file("ok.txt", "fine")
        .file("locked.txt", "private");
    let target = TreeBuilder::new()
        .file("locked.txt", "private")
        .file("extra.txt", "stale");
    let locked = source.join("locked.txt");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the file anyway.
    if std::fs::read(&locked).is_ok() {
        return;
    }

    let source_index = source.scan().await;
    let diff = DiffEngine::compare(&source_index, &target.scan().await);
    let plan = SyncPlanner::plan(&diff, SyncMode::Mirror, SyncDirection::AToB)
        .hold_back(&source_index.skipped_keys());

    assert_eq!(plan.held_back, vec![PathBuf::from("locked.txt")]);
    assert_eq!(plan.deletes().collect::<Vec<_>>(), vec![Path::new("extra.txt")]);

    let report = SyncExecutor::default()
        .execute(&plan, source.path(), target.path(), &NoopObserver)
        .await;
    assert!(report.is_success());
    assert_eq!(target.read("locked.txt"), b"private");
    assert!(!target.exists("extra.txt"));
    assert_eq!(target.read("ok.txt"), b"fine");

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();
}

#[tokio::test]
async fn test_copy_sync_keeps_extra_files() {
    let source = TreeBuilder::new().file("new.txt", "fresh");
    let target = TreeBuilder::new().file("keep.txt", "mine");

    let diff = DiffEngine::compare(&source.scan().await, &target.scan().await);
    let plan = SyncPlanner::plan(&diff, SyncMode::Copy, SyncDirection::AToB);
    assert_eq!(plan.deletes().count(), 0);

    SyncExecutor::default()
        .execute(&plan, source.path(), target.path(), &NoopObserver)
        .await;

    assert_eq!(target.read("new.txt"), b"fresh");
    assert!(target.exists("keep.txt"));

    let after = DiffEngine::compare(&source.scan().await, &target.scan().await);
    assert!(after.modifications.is_empty());
    assert!(after.deletions.is_empty());
    assert_eq!(after.addition_count(), 1);
}

#[tokio::test]
async fn test_copied_files_keep_mtime() {
    let source = TreeBuilder::new().file("dated.txt", "old news");
    let stamp = filetime::FileTime::from_unix_time(1_500_000_000, 0);
    filetime::set_file_mtime(source.join("dated.txt"), stamp).unwrap();
    let target = TreeBuilder::new();

    let index_a = source.scan().await;
    let diff = DiffEngine::compare(&index_a, &target.scan().await);
    let plan = SyncPlanner::plan(&diff, SyncMode::Copy, SyncDirection::AToB);
    SyncExecutor::new(ExecutorOptions::default())
        .execute(&plan, source.path(), target.path(), &NoopObserver)
        .await;

    let index_b = target.scan().await;
    let comparison = DiffEngine::inspect(&index_a, &index_b, Path::new("dated.txt")).unwrap();
    assert!(comparison.is_identical());
    assert!(!comparison.modified_differs);
}

#[cfg(unix)]
#[tokio::test]
async fn test_hardlink_dedup_shares_inode() {
    use std::os::unix::fs::MetadataExt;

    let tree = TreeBuilder::new()
        .file("a.txt", "same content")
        .file("b.txt", "same content")
        .file("nested/c.txt", "same content")
        .file("other.txt", "different");

    let index = tree.scan().await;
    let actions = HardlinkPlanner::plan(&DuplicateFinder::find(&index));
    assert_eq!(actions.len(), 2);
    assert!(actions.iter().all(|a| a.master == PathBuf::from("a.txt")));

    let report = LinkExecutor::default()
        .execute(&index, &actions, &NoopObserver)
        .await;
    assert!(report.is_success());

    let inode = |rel: &str| std::fs::metadata(tree.join(rel)).unwrap().ino();
    assert_eq!(inode("a.txt"), inode("b.txt"));
    assert_eq!(inode("a.txt"), inode("nested/c.txt"));
    assert_ne!(inode("a.txt"), inode("other.txt"));

    tree.remove("a.txt");
    assert_eq!(tree.read("b.txt"), b"same content");
    assert_eq!(tree.read("nested/c.txt"), b"same content");
}

#[cfg(unix)]
#[tokio::test]
async fn test_hardlink_dedup_across_roots() {
    use std::os::unix::fs::MetadataExt;

    let one = TreeBuilder::new().file("photo.jpg", "pixels");
    let two = TreeBuilder::new().file("copy/photo.jpg", "pixels");

    let index = scan_roots(&[one.path(), two.path()], ScanOptions::default()).await;
    let actions = HardlinkPlanner::plan(&DuplicateFinder::find(&index));
    assert_eq!(actions.len(), 1);

    let report = LinkExecutor::default()
        .execute(&index, &actions, &NoopObserver)
        .await;

    // Both temp dirs normally share a filesystem; a cross-device failure is
    // still a per-path error and never aborts the run.
    if report.is_success() {
        let a = std::fs::metadata(one.join("photo.jpg")).unwrap();
        let b = std::fs::metadata(two.join("copy/photo.jpg")).unwrap();
        assert_eq!(a.ino(), b.ino());
    } else {
        assert!(matches!(report.failures[0].error, Error::Link { .. }));
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_file_does_not_fail_scan() {
    use std::os::unix::fs::PermissionsExt;

    let tree = TreeBuilder::new()
        .file("readable.txt", "ok")
        .file("secret.txt", "hidden");
    let secret = tree.join("secret.txt");
    std::fs::set_permissions(&secret, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the file anyway.
    if std::fs::read(&secret).is_ok() {
        return;
    }

    let index = tree.scan().await;
    assert_eq!(index.len(), 1);
    assert_eq!(index.skipped(), &[secret.clone()]);

    std::fs::set_permissions(&secret, std::fs::Permissions::from_mode(0o644)).unwrap();
}

#[tokio::test]
async fn test_nonexistent_root_is_fatal() {
    let tree = TreeBuilder::new().file("a.txt", "x");
    let missing = tree.join("does-not-exist");

    let error = Scanner::default()
        .scan(&[tree.path(), missing.as_path()])
        .await
        .unwrap_err();

    assert!(matches!(error, Error::InvalidRoot { .. }));
    assert!(error.is_fatal());
}

#[tokio::test]
async fn test_namespaced_roots_report_cross_root_duplicates() {
    let one = TreeBuilder::new().file("same.txt", "shared");
    let two = TreeBuilder::new().file("same.txt", "shared");

    let index = scan_roots(&[one.path(), two.path()], ScanOptions::default()).await;
    assert_eq!(index.len(), 2);

    let groups = DuplicateFinder::find(&index);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
    assert!(groups[0].paths.contains(&one.join("same.txt")));
    assert!(groups[0].paths.contains(&two.join("same.txt")));
}

#[tokio::test]
async fn test_last_writer_wins_follows_root_order() {
    let one = TreeBuilder::new().file("same.txt", "first");
    let two = TreeBuilder::new().file("same.txt", "second");
    let options = ScanOptions::default().with_collision_policy(CollisionPolicy::LastWriterWins);

    for _ in 0..5 {
        let index = scan_roots(&[one.path(), two.path()], options).await;
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.digest_of(Path::new("same.txt")),
            Some(&hash_bytes(b"second"))
        );
        assert_eq!(index.digest_to_paths().len(), 2);
    }

    let reversed = scan_roots(&[two.path(), one.path()], options).await;
    assert_eq!(
        reversed.digest_of(Path::new("same.txt")),
        Some(&hash_bytes(b"first"))
    );
}

#[tokio::test]
async fn test_last_writer_wins_dedup_keeps_replaced_content() {
    let one = TreeBuilder::new().file("same.txt", "X-content");
    let two = TreeBuilder::new()
        .file("same.txt", "Y-unique-content")
        .file("other.txt", "X-content");
    let options = ScanOptions::default().with_collision_policy(CollisionPolicy::LastWriterWins);

    let index = scan_roots(&[one.path(), two.path()], options).await;
    let groups = DuplicateFinder::find(&index);
    assert!(groups.is_empty(), "unexpected groups: {groups:?}");

    let report = LinkExecutor::default()
        .execute(&index, &HardlinkPlanner::plan(&groups), &NoopObserver)
        .await;
    assert!(report.linked.is_empty());

    assert_eq!(one.read("same.txt"), b"X-content");
    assert_eq!(two.read("same.txt"), b"Y-unique-content");
    assert_eq!(two.read("other.txt"), b"X-content");
}

#[tokio::test]
async fn test_scan_options_from_config() {
    let config = ConfigBuilder::new().add_defaults().build().unwrap();
    let options = ScanOptions::from_config(&config.scan);

    assert_eq!(options.workers.get(), 8);
    assert_eq!(options.collision_policy, CollisionPolicy::Namespace);

    let tree = sample_tree();
    let index = scan_roots(&[tree.path()], options).await;
    assert_eq!(index.len(), 6);
}

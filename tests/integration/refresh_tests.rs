use branchboard::merge::ResolutionStrategy;
use branchboard::models::TaskSource;
use branchboard::{BoardConfig, RefreshOptions};

use super::test_helpers::{ahead, days_ago, task_body, write_local_task, Fixture};

#[tokio::test]
async fn cross_branch_refresh_returns_local_and_branch_tasks() {
    let fx = Fixture::new();
    write_local_task(
        fx.root.path(),
        "active",
        "task-1.md",
        &task_body("TASK-1", "To Do"),
    );
    fx.gateway.add_branch("feature", false, days_ago(1));
    fx.gateway.add_file(
        "feature",
        "tasks/active/task-2.md",
        task_body("TASK-2", "In Progress").as_bytes(),
        days_ago(1),
    );

    let outcome = fx
        .board()
        .refresh(RefreshOptions::default())
        .await
        .expect("refresh succeeds");

    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert_eq!(outcome.tasks.len(), 2);

    assert_eq!(outcome.tasks[0].id, "TASK-1");
    assert_eq!(outcome.tasks[0].source, TaskSource::Local);
    assert!(outcome.tasks[0].branch.is_none());

    assert_eq!(outcome.tasks[1].id, "TASK-2");
    assert_eq!(outcome.tasks[1].source, TaskSource::LocalBranch);
    assert_eq!(outcome.tasks[1].branch.as_deref(), Some("feature"));
    assert_eq!(outcome.tasks[1].status, "In Progress");
}

#[tokio::test]
async fn no_repository_still_returns_local_tasks() {
    let fx = Fixture::non_repository();
    write_local_task(
        fx.root.path(),
        "active",
        "task-1.md",
        &task_body("TASK-1", "To Do"),
    );

    let outcome = fx
        .board()
        .refresh(RefreshOptions::default())
        .await
        .expect("refresh never throws without a repository");

    assert_eq!(outcome.tasks.len(), 1);
    assert_eq!(outcome.tasks[0].id, "TASK-1");
    assert!(outcome
        .warnings
        .iter()
        .any(|warning| warning.contains("not a version-controlled")));
}

#[tokio::test]
async fn disabled_branch_checking_bypasses_the_gateway() {
    let fx = Fixture::new();
    write_local_task(
        fx.root.path(),
        "active",
        "task-1.md",
        &task_body("TASK-1", "To Do"),
    );
    fx.gateway.add_branch("feature", false, days_ago(1));
    fx.gateway.add_file(
        "feature",
        "tasks/active/task-2.md",
        task_body("TASK-2", "Done").as_bytes(),
        days_ago(1),
    );

    let config = BoardConfig {
        check_active_branches: false,
        ..BoardConfig::default()
    };
    let outcome = fx
        .board_with_config(config)
        .refresh(RefreshOptions::default())
        .await
        .expect("local-only refresh succeeds");

    assert_eq!(outcome.tasks.len(), 1);
    assert_eq!(outcome.tasks[0].id, "TASK-1");
    assert_eq!(fx.gateway.read_count(), 0);
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn local_copy_wins_and_branch_copy_becomes_an_alternate() {
    let fx = Fixture::new();
    write_local_task(
        fx.root.path(),
        "active",
        "task-1.md",
        &task_body("TASK-1", "To Do"),
    );
    fx.gateway.add_branch("feature", false, days_ago(0));
    fx.gateway.add_file(
        "feature",
        "tasks/active/task-1.md",
        task_body("TASK-1", "Done").as_bytes(),
        ahead(),
    );

    let outcome = fx
        .board()
        .refresh(RefreshOptions::default())
        .await
        .expect("refresh succeeds");

    assert_eq!(outcome.tasks.len(), 1);
    let task = &outcome.tasks[0];
    assert_eq!(task.status, "To Do");
    assert_eq!(task.source, TaskSource::Local);
    assert_eq!(task.alternates.len(), 1);
    assert_eq!(task.alternates[0].branch, "feature");
    assert_eq!(task.alternates[0].status, "Done");
}

#[tokio::test]
async fn recency_window_gates_branch_participation() {
    let fx = Fixture::new();
    fx.gateway.add_branch("dormant", false, days_ago(60));
    fx.gateway.add_file(
        "dormant",
        "tasks/active/task-3.md",
        task_body("TASK-3", "In Progress").as_bytes(),
        days_ago(60),
    );

    let board = fx.board();

    let narrow = board
        .refresh(RefreshOptions::default())
        .await
        .expect("refresh succeeds");
    assert!(narrow.tasks.is_empty());

    let wide = board
        .refresh(RefreshOptions {
            window_days: Some(90),
            ..RefreshOptions::default()
        })
        .await
        .expect("refresh succeeds");
    assert_eq!(wide.tasks.len(), 1);
    assert_eq!(wide.tasks[0].id, "TASK-3");
}

#[tokio::test]
async fn strategy_override_changes_the_survivor() {
    let fx = Fixture::new();
    fx.gateway.add_branch("fresh", false, days_ago(0));
    fx.gateway.add_file(
        "fresh",
        "tasks/active/task-9.md",
        task_body("TASK-9", "To Do").as_bytes(),
        days_ago(1),
    );
    fx.gateway.add_branch("stale", false, days_ago(0));
    fx.gateway.add_file(
        "stale",
        "tasks/active/task-9.md",
        task_body("TASK-9", "Done").as_bytes(),
        days_ago(5),
    );

    let board = fx.board();

    let by_time = board
        .refresh(RefreshOptions::default())
        .await
        .expect("refresh succeeds");
    assert_eq!(by_time.tasks.len(), 1);
    assert_eq!(by_time.tasks[0].status, "To Do");
    assert_eq!(by_time.tasks[0].branch.as_deref(), Some("fresh"));

    let by_progress = board
        .refresh(RefreshOptions {
            strategy: Some(ResolutionStrategy::MostProgressed),
            ..RefreshOptions::default()
        })
        .await
        .expect("refresh succeeds");
    assert_eq!(by_progress.tasks.len(), 1);
    assert_eq!(by_progress.tasks[0].status, "Done");
    assert_eq!(by_progress.tasks[0].branch.as_deref(), Some("stale"));
}

#[tokio::test]
async fn one_failing_branch_does_not_abort_the_others() {
    let fx = Fixture::new();
    fx.gateway.add_branch("feature", false, days_ago(1));
    fx.gateway.add_file(
        "feature",
        "tasks/active/task-2.md",
        task_body("TASK-2", "In Progress").as_bytes(),
        days_ago(1),
    );
    fx.gateway.add_branch("broken", false, days_ago(1));
    fx.gateway.fail_branch("broken");

    let outcome = fx
        .board()
        .refresh(RefreshOptions::default())
        .await
        .expect("refresh succeeds despite one bad branch");

    assert_eq!(outcome.tasks.len(), 1);
    assert_eq!(outcome.tasks[0].id, "TASK-2");
    assert!(outcome
        .warnings
        .iter()
        .any(|warning| warning.contains("broken")));
}

#[tokio::test]
async fn undecodable_branch_file_is_dropped_with_a_warning() {
    let fx = Fixture::new();
    fx.gateway.add_branch("feature", false, days_ago(1));
    fx.gateway.add_file(
        "feature",
        "tasks/active/task-2.md",
        b"status: In Progress\n", // no id line
        days_ago(1),
    );
    fx.gateway.add_file(
        "feature",
        "tasks/active/task-3.md",
        task_body("TASK-3", "To Do").as_bytes(),
        days_ago(1),
    );

    let outcome = fx
        .board()
        .refresh(RefreshOptions::default())
        .await
        .expect("refresh succeeds");

    assert_eq!(outcome.tasks.len(), 1);
    assert_eq!(outcome.tasks[0].id, "TASK-3");
    assert!(outcome
        .warnings
        .iter()
        .any(|warning| warning.contains("task-2.md")));
}

#[tokio::test]
async fn draft_and_completed_directories_tag_their_sources() {
    let fx = Fixture::new();
    write_local_task(
        fx.root.path(),
        "draft",
        "task-4.md",
        &task_body("TASK-4", "To Do"),
    );
    write_local_task(
        fx.root.path(),
        "completed",
        "task-5.md",
        &task_body("TASK-5", "Done"),
    );
    write_local_task(
        fx.root.path(),
        "archived",
        "task-6.md",
        &task_body("TASK-6", "Done"),
    );

    let outcome = fx
        .board()
        .refresh(RefreshOptions::default())
        .await
        .expect("refresh succeeds");

    assert_eq!(outcome.tasks.len(), 2, "archived tasks stay hidden");
    assert_eq!(outcome.tasks[0].id, "TASK-4");
    assert_eq!(outcome.tasks[0].source, TaskSource::Local);
    assert_eq!(outcome.tasks[1].id, "TASK-5");
    assert_eq!(outcome.tasks[1].source, TaskSource::Completed);
}

#[tokio::test]
async fn remote_branch_copies_are_tagged_remote() {
    let fx = Fixture::new();
    fx.gateway.add_branch("origin/review", true, days_ago(1));
    fx.gateway.add_file(
        "origin/review",
        "tasks/active/task-7.md",
        task_body("TASK-7", "In Progress").as_bytes(),
        days_ago(1),
    );

    let config = BoardConfig {
        remote_operations: true,
        ..BoardConfig::default()
    };
    let outcome = fx
        .board_with_config(config)
        .refresh(RefreshOptions::default())
        .await
        .expect("refresh succeeds");

    assert_eq!(outcome.tasks.len(), 1);
    assert_eq!(outcome.tasks[0].source, TaskSource::Remote);
    assert_eq!(outcome.tasks[0].branch.as_deref(), Some("origin/review"));
}

#[tokio::test]
async fn main_branch_is_exposed_for_callers() {
    let fx = Fixture::new();

    assert_eq!(
        fx.board().main_branch().await.expect("main exists"),
        "main"
    );
}

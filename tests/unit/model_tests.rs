use branchboard::models::{normalize_id, BranchDescriptor, TaskRecord, TaskSource};
use chrono::Utc;

#[test]
fn ids_normalize_by_trimming_and_uppercasing() {
    assert_eq!(normalize_id("task-12"), "TASK-12");
    assert_eq!(normalize_id("  Task-12 "), "TASK-12");
    assert_eq!(normalize_id("TASK-12"), "TASK-12");
}

#[test]
fn new_records_normalize_their_id() {
    let task = TaskRecord::new("task-3", "To Do");

    assert_eq!(task.id, "TASK-3");
    assert_eq!(task.source, TaskSource::Local);
    assert!(task.branch.is_none());
    assert!(task.alternates.is_empty());
}

#[test]
fn alternate_views_carry_branch_status_and_time() {
    let mut task = TaskRecord::new("task-3", "Done");
    task.branch = Some("feature".to_owned());

    let alternate = task.as_alternate("feature");

    assert_eq!(alternate.branch, "feature");
    assert_eq!(alternate.status, "Done");
    assert_eq!(alternate.modified_at, task.modified_at);
}

#[test]
fn source_tags_serialize_in_kebab_case() {
    let json = serde_json::to_string(&TaskSource::LocalBranch).expect("serializes");
    assert_eq!(json, "\"local-branch\"");

    let json = serde_json::to_string(&TaskSource::Completed).expect("serializes");
    assert_eq!(json, "\"completed\"");
}

#[test]
fn extra_fields_round_trip_through_serde() {
    let mut task = TaskRecord::new("task-1", "To Do");
    task.extra.insert(
        "labels".to_owned(),
        serde_json::json!(["engine", "cache"]),
    );

    let json = serde_json::to_string(&task).expect("serializes");
    let back: TaskRecord = serde_json::from_str(&json).expect("deserializes");

    assert_eq!(back.extra["labels"], serde_json::json!(["engine", "cache"]));
}

#[test]
fn remote_branch_short_names_strip_the_remote() {
    let remote = BranchDescriptor {
        name: "origin/feature/login".to_owned(),
        is_remote: true,
        last_commit: Utc::now(),
    };
    assert_eq!(remote.short_name(), "feature/login");

    let local = BranchDescriptor {
        name: "feature/login".to_owned(),
        is_remote: false,
        last_commit: Utc::now(),
    };
    assert_eq!(local.short_name(), "feature/login");
}

//! Integration tests for persistence and repository properties.
//!
//! Every invocation loads the whole file, changes one thing, and writes the
//! whole file back; these tests check that what lands on disk stays
//! consistent across such round trips.

mod common;

use chrono::{TimeZone, Utc};
use common::TestEnv;
use std::collections::HashSet;
use task_cli::{RepositoryLifecycleExt, Status, Storage, Task};

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_create_on_empty_store() {
    let mut env = TestEnv::new();

    let id = env.create_task("buy milk");
    assert_eq!(id, 1);

    let task = &env.persisted()[0];
    assert_eq!(task.id, 1);
    assert_eq!(task.description, "buy milk");
    assert_eq!(task.status, Status::Todo);
    assert!(task.created_at.is_some());
    assert!(task.updated_at.is_none());
}

#[test]
fn test_update_sets_updated_at() {
    let mut env = TestEnv::new();
    let id = env.create_task("buy milk");

    env.repo.update(id, "buy bread").unwrap();

    let task = &env.persisted()[0];
    assert_eq!(task.description, "buy bread");
    assert!(task.updated_at.is_some());
    assert!(task.updated_at >= task.created_at);
}

#[test]
fn test_set_status_done() {
    let mut env = TestEnv::new();
    let id = env.create_task("buy milk");

    env.repo.set_status(id, Status::Done).unwrap();

    let task = &env.persisted()[0];
    assert_eq!(task.status, Status::Done);
    assert!(task.updated_at.is_some());
}

#[test]
fn test_each_invocation_sees_previous_writes() {
    let mut env = TestEnv::new();
    env.create_task("first");

    // A second "process" adds to what the first wrote
    let mut second = env.reopen();
    let id = second.create("second").unwrap();
    assert_eq!(id, 2);
    second.start(1).unwrap();

    let third = env.reopen();
    assert_eq!(third.len(), 2);
    assert_eq!(third.find(1).unwrap().status, Status::InProgress);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_ids_strictly_increasing_and_unique() {
    let mut env = TestEnv::new();

    let ids: Vec<u64> = (0..25).map(|i| env.create_task(&format!("task {}", i))).collect();

    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_ids_increase_across_reopen() {
    let mut env = TestEnv::new();
    let mut last = 0;

    for i in 0..5 {
        let mut repo = env.reopen();
        let id = repo.create(&format!("task {}", i)).unwrap();
        assert!(id > last);
        last = id;
    }

    env.repo = env.reopen();
    assert_eq!(env.repo.len(), 5);
}

#[test]
fn test_save_load_roundtrip_field_for_field() {
    let env = TestEnv::new();
    let storage = Storage::new(env.store_path());

    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap();
    let mut in_progress = Task::new(2, "write report", created);
    in_progress.status = Status::InProgress;
    in_progress.touch(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    let legacy = Task {
        id: 9,
        description: "no dates".to_string(),
        status: Status::Done,
        created_at: None,
        updated_at: None,
    };
    let tasks = vec![Task::new(1, "buy milk", created), in_progress, legacy];

    storage.save(&tasks).unwrap();
    assert_eq!(storage.load().unwrap(), tasks);
}

#[test]
fn test_delete_twice_same_as_once() {
    let mut env = TestEnv::new();
    let a = env.create_task("a");
    env.create_task("b");

    assert!(env.repo.delete(a).unwrap());
    let after_once = env.file_bytes();

    assert!(!env.repo.delete(a).unwrap());
    assert_eq!(env.file_bytes(), after_once);
    assert_eq!(env.persisted().len(), 1);
}

#[test]
fn test_list_by_status_is_exact_ordered_subset() {
    let mut env = TestEnv::new();
    let statuses = [
        Status::Done,
        Status::Todo,
        Status::InProgress,
        Status::Todo,
        Status::Done,
        Status::InProgress,
        Status::Todo,
    ];

    for (i, status) in statuses.iter().enumerate() {
        let id = env.create_task(&format!("task {}", i));
        env.repo.set_status(id, *status).unwrap();
    }
    env.repo = env.reopen();

    for status in Status::ALL {
        let expected: Vec<u64> = env
            .repo
            .list()
            .iter()
            .filter(|t| t.status == status)
            .map(|t| t.id)
            .collect();
        assert_eq!(env.ids_with_status(status), expected);
        assert!(
            env.repo.list_by_status(status).iter().all(|t| t.status == status),
            "listing {} returned a task with another status",
            status
        );
    }

    let total: usize = Status::ALL.iter().map(|s| env.repo.list_by_status(*s).len()).sum();
    assert_eq!(total, statuses.len());
}

#[test]
fn test_insertion_order_kept_after_mutation() {
    let mut env = TestEnv::new();
    let a = env.create_task("a");
    let b = env.create_task("b");
    let c = env.create_task("c");

    env.repo.update(a, "a2").unwrap();
    env.repo.complete(b).unwrap();

    let order: Vec<u64> = env.persisted().iter().map(|t| t.id).collect();
    assert_eq!(order, vec![a, b, c]);
}

// =============================================================================
// On-Disk Format
// =============================================================================

#[test]
fn test_file_is_json_array_with_expected_fields() {
    let mut env = TestEnv::new();
    let id = env.create_task("buy milk");
    env.repo.start(id).unwrap();
    env.create_task("second");

    let value: serde_json::Value = serde_json::from_slice(&env.file_bytes()).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 2);

    let first = array[0].as_object().unwrap();
    let mut keys: Vec<&str> = first.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["createdAt", "description", "id", "status", "updatedAt"]);
    assert_eq!(first["status"], "IN_PROGRESS");
    assert!(first["createdAt"].as_str().unwrap().ends_with('Z'));

    // Never-modified task keeps an explicit null
    assert!(array[1]["updatedAt"].is_null());
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{insert_sink, setup_db};
use spiderd::domain::models::data_sink::OutputType;
use spiderd::domain::models::task::{RecurrenceState, Task, TaskPatch, TaskStatus};
use spiderd::domain::repositories::data_sink_repository::DataSinkRepository;
use spiderd::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use spiderd::infrastructure::repositories::data_sink_repo_impl::DataSinkRepositoryImpl;
use spiderd::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;

fn new_task() -> Task {
    Task::new("news".to_string(), "default".to_string(), OutputType::Csv, 7)
        .with_description("daily headlines")
        .with_cron_spec(Some("0 0 * * *".to_string()))
}

#[tokio::test]
async fn test_create_assigns_id_and_round_trips() {
    let repo = TaskRepositoryImpl::new(setup_db().await);

    let created = repo.create(&new_task()).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.status, TaskStatus::Running);
    assert_eq!(created.counts, 0);

    let second = repo.create(&new_task()).await.unwrap();
    assert_ne!(second.id, created.id);

    let found = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.description, "daily headlines");
    assert_eq!(found.output_type, OutputType::Csv);
    assert_eq!(found.cron_spec.as_deref(), Some("0 0 * * *"));
    assert_eq!(found.recurrence_state, RecurrenceState::None);
    assert!(repo.find_by_id(created.id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_only_touches_patched_fields() {
    let repo = TaskRepositoryImpl::new(setup_db().await);
    let created = repo.create(&new_task()).await.unwrap();

    repo.update(
        created.id,
        &TaskPatch::new().recurrence_state(RecurrenceState::Active),
    )
    .await
    .unwrap();
    repo.update(
        created.id,
        &TaskPatch::new().status(TaskStatus::Completed).counts(1),
    )
    .await
    .unwrap();

    let found = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.status, TaskStatus::Completed);
    assert_eq!(found.counts, 1);
    assert_eq!(found.recurrence_state, RecurrenceState::Active);
    assert_eq!(found.name, "news");
    assert!(found.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_equal_updates_are_idempotent() {
    let repo = TaskRepositoryImpl::new(setup_db().await);
    let created = repo.create(&new_task()).await.unwrap();
    let patch = TaskPatch::new().status(TaskStatus::Completed).counts(2);

    repo.update(created.id, &patch).await.unwrap();
    let once = repo.find_by_id(created.id).await.unwrap().unwrap();
    repo.update(created.id, &patch).await.unwrap();
    let twice = repo.find_by_id(created.id).await.unwrap().unwrap();

    assert_eq!(once.status, twice.status);
    assert_eq!(once.counts, twice.counts);
    assert_eq!(twice.counts, 2);
}

#[tokio::test]
async fn test_update_missing_task_is_not_found() {
    let repo = TaskRepositoryImpl::new(setup_db().await);

    let err = repo
        .update(42, &TaskPatch::new().status(TaskStatus::Stopped))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
async fn test_data_sink_lookup() {
    let db = setup_db().await;
    let id = insert_sink(db.as_ref()).await;
    let repo = DataSinkRepositoryImpl::new(db);

    let sink = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(sink.host, "127.0.0.1");
    assert_eq!(sink.port, 3306);
    assert!(!format!("{:?}", sink).contains("secret"));

    assert!(repo.find_by_id(id + 1).await.unwrap().is_none());
}

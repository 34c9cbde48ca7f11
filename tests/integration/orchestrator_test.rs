// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::manual_scheduler::ManualScheduler;
use super::helpers::{
    create_context, create_context_with, request, task_count, wait_for_task,
};
use chrono::Utc;
use spiderd::application::use_cases::task_orchestrator::OrchestrationError;
use spiderd::domain::models::task::{RecurrenceState, TaskStatus};
use spiderd::domain::repositories::task_repository::TaskRepository;
use spiderd::utils::errors::{NotFoundError, ValidationError};

#[tokio::test]
async fn test_create_task_with_defaults_runs_once() {
    let ctx = create_context().await;
    let started = Utc::now();

    let summary = ctx
        .orchestrator
        .create_task(request(ctx.sink_id))
        .await
        .unwrap();

    assert!(summary.id > 0);
    assert!(summary.created_at.timestamp() >= started.timestamp());
    assert_eq!(summary.status, TaskStatus::Running);
    assert_eq!(summary.recurrence_state, RecurrenceState::None);

    let stored = ctx.task_repo.find_by_id(summary.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "news");
    assert_eq!(stored.rule_name, "default");
    assert_eq!(stored.sink_id, ctx.sink_id);
    assert!(stored.cron_spec.is_none());

    let finished = wait_for_task(&ctx.task_repo, summary.id, |t| t.counts == 1).await;
    assert_eq!(finished.status, TaskStatus::Completed);
    assert_eq!(ManualScheduler::count(&ctx.scheduler.registered), 0);
}

#[tokio::test]
async fn test_invalid_filter_leaves_no_record() {
    let ctx = create_context().await;
    let mut req = request(ctx.sink_id);
    req.opt_url_filters = "[".to_string();

    let err = ctx.orchestrator.create_task(req).await.unwrap_err();

    assert!(matches!(
        err,
        OrchestrationError::Validation(ValidationError::InvalidFilterPattern { .. })
    ));
    assert_eq!(task_count(ctx.db.as_ref()).await, 0);
}

#[tokio::test]
async fn test_unknown_sink_leaves_no_record() {
    let ctx = create_context().await;
    let mut req = request(ctx.sink_id);
    req.sink_id = "999".to_string();

    let err = ctx.orchestrator.create_task(req).await.unwrap_err();

    assert!(matches!(
        err,
        OrchestrationError::NotFound(NotFoundError::SinkNotFound(999))
    ));
    assert_eq!(task_count(ctx.db.as_ref()).await, 0);
}

#[tokio::test]
async fn test_cron_task_counts_every_firing() {
    let ctx = create_context().await;
    let mut req = request(ctx.sink_id);
    req.cron_spec = "*/5 * * * *".to_string();

    let summary = ctx.orchestrator.create_task(req).await.unwrap();

    assert_eq!(summary.recurrence_state, RecurrenceState::Active);
    assert_eq!(ManualScheduler::count(&ctx.scheduler.registered), 1);
    assert_eq!(ManualScheduler::count(&ctx.scheduler.started), 1);

    let task = wait_for_task(&ctx.task_repo, summary.id, |t| t.counts == 1).await;
    assert_eq!(task.cron_spec.as_deref(), Some("*/5 * * * *"));
    assert_eq!(task.recurrence_state, RecurrenceState::Active);

    ctx.scheduler.fire().await;
    wait_for_task(&ctx.task_repo, summary.id, |t| t.counts == 2).await;
    ctx.scheduler.fire().await;
    let task = wait_for_task(&ctx.task_repo, summary.id, |t| t.counts == 3).await;
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_register_failure_is_reported_not_returned() {
    let ctx = create_context_with(ManualScheduler::rejecting()).await;
    let mut req = request(ctx.sink_id);
    req.cron_spec = "*/5 * * * *".to_string();

    let summary = ctx.orchestrator.create_task(req).await.unwrap();

    assert_eq!(summary.status, TaskStatus::Running);
    assert_eq!(summary.recurrence_state, RecurrenceState::Failed);
    assert_eq!(ManualScheduler::count(&ctx.scheduler.started), 0);

    // the first run still happens
    let task = wait_for_task(&ctx.task_repo, summary.id, |t| t.counts == 1).await;
    assert_eq!(task.recurrence_state, RecurrenceState::Failed);
}

#[tokio::test]
async fn test_stop_task_marks_record_stopped() {
    let ctx = create_context().await;
    let mut req = request(ctx.sink_id);
    req.cron_spec = "@every 1h".to_string();

    let summary = ctx.orchestrator.create_task(req).await.unwrap();
    wait_for_task(&ctx.task_repo, summary.id, |t| t.counts == 1).await;

    ctx.orchestrator.stop_task(summary.id).await.unwrap();

    let task = ctx.task_repo.find_by_id(summary.id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Stopped);
    assert_eq!(task.counts, 1);
    assert_eq!(ManualScheduler::count(&ctx.scheduler.stopped), 1);
    assert_eq!(ctx.orchestrator.active_tasks(), 0);

    let err = ctx.orchestrator.stop_task(summary.id).await.unwrap_err();
    assert_eq!(err.phase(), "lookup");
}

#[tokio::test]
async fn test_finished_one_shot_task_cannot_be_stopped() {
    let ctx = create_context().await;
    let summary = ctx
        .orchestrator
        .create_task(request(ctx.sink_id))
        .await
        .unwrap();
    wait_for_task(&ctx.task_repo, summary.id, |t| t.counts == 1).await;

    // the listener exits once the only run has reported
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    while ctx.orchestrator.active_tasks() > 0 {
        assert!(tokio::time::Instant::now() < deadline);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let err = ctx.orchestrator.stop_task(summary.id).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestrationError::NotFound(NotFoundError::TaskNotFound(_))
    ));

    let task = ctx.task_repo.find_by_id(summary.id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
}

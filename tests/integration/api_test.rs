// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_context, task_count, wait_for_task, TestContext};
use axum::http::StatusCode;
use axum::Extension;
use axum_test::TestServer;
use serde_json::{json, Value};
use spiderd::application::dto::create_task_request::TaskSummary;
use spiderd::domain::models::task::{RecurrenceState, TaskStatus};
use spiderd::presentation::routes;

fn test_server(ctx: &TestContext) -> TestServer {
    let app = routes::routes()
        .layer(Extension(ctx.orchestrator.clone()))
        .layer(Extension(ctx.task_repo.clone()))
        .layer(Extension(ctx.rules.clone()));
    TestServer::new(app).unwrap()
}

fn payload(ctx: &TestContext) -> Value {
    json!({
        "task_name": "news",
        "task_rule_name": "default",
        "sysdb_id": ctx.sink_id.to_string(),
        "output_type": "mysql"
    })
}

#[tokio::test]
async fn test_health_check() {
    let ctx = create_context().await;
    let server = test_server(&ctx);

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_create_task_returns_summary() {
    let ctx = create_context().await;
    let server = test_server(&ctx);

    let response = server.post("/v1/tasks").json(&payload(&ctx)).await;
    response.assert_status(StatusCode::CREATED);

    let summary: TaskSummary = response.json();
    assert!(summary.id > 0);
    assert_eq!(summary.status, TaskStatus::Running);
    assert_eq!(summary.recurrence_state, RecurrenceState::None);

    wait_for_task(&ctx.task_repo, summary.id, |t| t.counts == 1).await;

    let response = server.get(&format!("/v1/tasks/{}", summary.id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["counts"], 1);
    assert_eq!(body["rule_name"], "default");
}

#[tokio::test]
async fn test_invalid_filter_is_bad_request() {
    let ctx = create_context().await;
    let server = test_server(&ctx);
    let mut body = payload(&ctx);
    body["opt_url_filters"] = json!("[");

    let response = server.post("/v1/tasks").json(&body).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let error: Value = response.json();
    assert_eq!(error["phase"], "validation");
    assert_eq!(task_count(ctx.db.as_ref()).await, 0);
}

#[tokio::test]
async fn test_unknown_rule_is_not_found() {
    let ctx = create_context().await;
    let server = test_server(&ctx);
    let mut body = payload(&ctx);
    body["task_rule_name"] = json!("missing");

    let response = server.post("/v1/tasks").json(&body).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let error: Value = response.json();
    assert_eq!(error["phase"], "lookup");
    assert!(error["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_stop_recurring_task() {
    let ctx = create_context().await;
    let server = test_server(&ctx);
    let mut body = payload(&ctx);
    body["cron_spec"] = json!("@every 1h");

    let summary: TaskSummary = server.post("/v1/tasks").json(&body).await.json();
    assert_eq!(summary.recurrence_state, RecurrenceState::Active);

    let response = server.delete(&format!("/v1/tasks/{}", summary.id)).await;
    response.assert_status(StatusCode::NO_CONTENT);

    let task: Value = server
        .get(&format!("/v1/tasks/{}", summary.id))
        .await
        .json();
    assert_eq!(task["status"], "stopped");

    let response = server.delete(&format!("/v1/tasks/{}", summary.id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let ctx = create_context().await;
    let server = test_server(&ctx);

    server
        .get("/v1/tasks/12345")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/v1/tasks/12345")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_rules() {
    let ctx = create_context().await;
    let server = test_server(&ctx);

    let rules: Vec<String> = server.get("/v1/rules").await.json();
    assert_eq!(rules, vec!["default".to_string()]);
}

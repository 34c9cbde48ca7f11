// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::{
    application::{
        dto::create_task_request::{CreateTaskRequest, TaskSummary},
        use_cases::task_orchestrator::TaskOrchestrator,
    },
    domain::{
        models::task::{Task, TaskId},
        repositories::{
            data_sink_repository::DataSinkRepository, rule_repository::RuleRepository,
            task_repository::TaskRepository,
        },
    },
    presentation::errors::AppError,
    utils::errors::NotFoundError,
};

/// 创建任务
pub async fn create_task<TR, SR, RR>(
    Extension(orchestrator): Extension<Arc<TaskOrchestrator<TR, SR, RR>>>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskSummary>), AppError>
where
    TR: TaskRepository + 'static,
    SR: DataSinkRepository + 'static,
    RR: RuleRepository + 'static,
{
    info!(
        "Create task request: name={}, rule={}",
        payload.task_name, payload.task_rule_name
    );
    let summary = orchestrator.create_task(payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// 停止任务
pub async fn stop_task<TR, SR, RR>(
    Extension(orchestrator): Extension<Arc<TaskOrchestrator<TR, SR, RR>>>,
    Path(id): Path<TaskId>,
) -> Result<StatusCode, AppError>
where
    TR: TaskRepository + 'static,
    SR: DataSinkRepository + 'static,
    RR: RuleRepository + 'static,
{
    orchestrator.stop_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 查询任务当前状态
pub async fn get_task<TR>(
    Extension(task_repo): Extension<Arc<TR>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, AppError>
where
    TR: TaskRepository + 'static,
{
    let task = task_repo
        .find_by_id(id)
        .await?
        .ok_or(NotFoundError::TaskNotFound(id))?;
    Ok(Json(task))
}

/// 列出已注册的任务规则
pub async fn list_rules<RR>(Extension(rules): Extension<Arc<RR>>) -> Json<Vec<String>>
where
    RR: RuleRepository + 'static,
{
    Json(rules.list().await)
}

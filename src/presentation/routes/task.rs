// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::routing::{get, post};
use axum::Router;

use crate::application::use_cases::task_orchestrator::TaskOrchestrator;
use crate::infrastructure::repositories::data_sink_repo_impl::DataSinkRepositoryImpl;
use crate::infrastructure::repositories::rule_registry::RuleRegistry;
use crate::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use crate::presentation::handlers::task_handler;

/// 服务使用的编排器类型
pub type AppOrchestrator = TaskOrchestrator<TaskRepositoryImpl, DataSinkRepositoryImpl, RuleRegistry>;

/// 任务路由
///
/// 依赖以下 `Extension`：`Arc<AppOrchestrator>`、`Arc<TaskRepositoryImpl>`、`Arc<RuleRegistry>`
pub fn task_routes() -> Router {
    Router::new()
        .route(
            "/v1/tasks",
            post(
                task_handler::create_task::<
                    TaskRepositoryImpl,
                    DataSinkRepositoryImpl,
                    RuleRegistry,
                >,
            ),
        )
        .route(
            "/v1/tasks/{id}",
            get(task_handler::get_task::<TaskRepositoryImpl>).delete(
                task_handler::stop_task::<TaskRepositoryImpl, DataSinkRepositoryImpl, RuleRegistry>,
            ),
        )
        .route("/v1/rules", get(task_handler::list_rules::<RuleRegistry>))
}

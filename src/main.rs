// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Extension;
use spiderd::application::use_cases::task_orchestrator::TaskOrchestrator;
use spiderd::config::settings::Settings;
use spiderd::engines::launcher::ExecutionLauncher;
use spiderd::engines::reqwest_engine::ReqwestEngine;
use spiderd::infrastructure::database::connection;
use spiderd::infrastructure::repositories::data_sink_repo_impl::DataSinkRepositoryImpl;
use spiderd::infrastructure::repositories::rule_registry::RuleRegistry;
use spiderd::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use spiderd::presentation::routes;
use spiderd::queue::scheduler::CronRecurrenceScheduler;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use migration::{Migrator, MigratorTrait};
use spiderd::utils::telemetry;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting spiderd...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // Initialize Prometheus Metrics
    spiderd::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize repositories
    let task_repo = Arc::new(TaskRepositoryImpl::new(db.clone()));
    let sink_repo = Arc::new(DataSinkRepositoryImpl::new(db.clone()));
    let rules = Arc::new(RuleRegistry::from_rules(settings.rules.iter().cloned())?);
    if rules.is_empty() {
        warn!("No task rules configured, every create request will be rejected");
    }
    info!("{} task rules registered", rules.len());

    // 5. Initialize engine, scheduler and orchestrator
    let engine = Arc::new(ReqwestEngine::new(&settings.engine)?);
    let scheduler = Arc::new(CronRecurrenceScheduler::new().await?);
    let launcher = ExecutionLauncher::new(engine, settings.orchestrator.completion_buffer);
    let orchestrator = Arc::new(TaskOrchestrator::new(
        task_repo.clone(),
        sink_repo,
        rules.clone(),
        launcher,
        scheduler.clone(),
    ));

    // 6. Start HTTP server
    let app = routes::routes()
        .layer(Extension(orchestrator.clone()))
        .layer(Extension(task_repo))
        .layer(Extension(rules))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 7. Stop every task before exiting
    orchestrator.shutdown().await;
    scheduler.shutdown().await;
    info!("spiderd stopped");

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}

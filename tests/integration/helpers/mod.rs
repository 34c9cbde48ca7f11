// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod manual_scheduler;

use chrono::Utc;
use manual_scheduler::ManualScheduler;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, Set};
use spiderd::application::dto::create_task_request::CreateTaskRequest;
use spiderd::application::use_cases::task_orchestrator::TaskOrchestrator;
use spiderd::config::settings::EngineSettings;
use spiderd::domain::models::task::{Task, TaskId};
use spiderd::domain::models::task_rule::TaskRule;
use spiderd::domain::repositories::task_repository::TaskRepository;
use spiderd::engines::launcher::ExecutionLauncher;
use spiderd::engines::reqwest_engine::ReqwestEngine;
use spiderd::infrastructure::database::entities::{data_sink, task as task_entity};
use spiderd::infrastructure::repositories::data_sink_repo_impl::DataSinkRepositoryImpl;
use spiderd::infrastructure::repositories::rule_registry::RuleRegistry;
use spiderd::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type TestOrchestrator = TaskOrchestrator<TaskRepositoryImpl, DataSinkRepositoryImpl, RuleRegistry>;

#[allow(dead_code)]
pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub task_repo: Arc<TaskRepositoryImpl>,
    pub rules: Arc<RuleRegistry>,
    pub orchestrator: Arc<TestOrchestrator>,
    pub scheduler: Arc<ManualScheduler>,
    pub sink_id: i64,
    // Keep the seed site alive
    pub server: MockServer,
}

pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(db);
    Migrator::up(db.as_ref(), None).await.unwrap();
    db
}

pub async fn insert_sink(db: &DatabaseConnection) -> i64 {
    let sink = data_sink::ActiveModel {
        id: NotSet,
        name: Set("warehouse".to_string()),
        host: Set("127.0.0.1".to_string()),
        port: Set(3306),
        user: Set("spider".to_string()),
        password: Set("secret".to_string()),
        db_name: Set("crawl".to_string()),
        created_at: Set(Utc::now().into()),
    };
    sink.insert(db).await.unwrap().id
}

/// 启动一个只有首页的种子站点
pub async fn seed_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body><h1>seed</h1></body></html>"),
        )
        .mount(&server)
        .await;
    server
}

pub fn engine_settings() -> EngineSettings {
    EngineSettings {
        request_timeout: 5,
        default_user_agent: "spiderd-test".to_string(),
    }
}

pub async fn create_context() -> TestContext {
    create_context_with(ManualScheduler::new()).await
}

pub async fn create_context_with(scheduler: ManualScheduler) -> TestContext {
    let db = setup_db().await;
    let sink_id = insert_sink(db.as_ref()).await;
    let server = seed_site().await;

    let task_repo = Arc::new(TaskRepositoryImpl::new(db.clone()));
    let sink_repo = Arc::new(DataSinkRepositoryImpl::new(db.clone()));
    let rules = Arc::new(
        RuleRegistry::from_rules([TaskRule {
            ignore_robots_txt: true,
            ..TaskRule::new("default").with_seed_urls([format!("{}/", server.uri())])
        }])
        .unwrap(),
    );
    let engine = Arc::new(ReqwestEngine::new(&engine_settings()).unwrap());
    let scheduler = Arc::new(scheduler);

    let orchestrator = Arc::new(TaskOrchestrator::new(
        task_repo.clone(),
        sink_repo,
        rules.clone(),
        ExecutionLauncher::new(engine, 8),
        scheduler.clone(),
    ));

    TestContext {
        db,
        task_repo,
        rules,
        orchestrator,
        scheduler,
        sink_id,
        server,
    }
}

pub fn request(sink_id: i64) -> CreateTaskRequest {
    CreateTaskRequest {
        task_name: "news".to_string(),
        task_rule_name: "default".to_string(),
        sink_id: sink_id.to_string(),
        ..Default::default()
    }
}

pub async fn task_count(db: &DatabaseConnection) -> u64 {
    task_entity::Entity::find().count(db).await.unwrap()
}

/// 轮询任务记录直到满足条件
pub async fn wait_for_task<F>(repo: &TaskRepositoryImpl, id: TaskId, mut done: F) -> Task
where
    F: FnMut(&Task) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let task = repo.find_by_id(id).await.unwrap().unwrap();
        if done(&task) {
            return task;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "task {} never reached the expected state: {:?}",
            id,
            task
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

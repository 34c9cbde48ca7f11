// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{Task, TaskId, TaskPatch};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::infrastructure::database::entities::task as task_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, Set,
};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct TaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl TaskRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的任务仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<task_entity::Model> for Task {
    fn from(model: task_entity::Model) -> Self {
        let output_type = model.output_type.parse().unwrap_or_else(|_| {
            warn!(
                "Task {} has unknown output type `{}`",
                model.id, model.output_type
            );
            Default::default()
        });

        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            rule_name: model.rule_name,
            status: model.status.parse().unwrap_or_default(),
            counts: model.counts,
            cron_spec: model.cron_spec,
            recurrence_state: model.recurrence_state.parse().unwrap_or_default(),
            output_type,
            sink_id: model.sink_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Task> for task_entity::ActiveModel {
    fn from(task: &Task) -> Self {
        Self {
            // id is assigned by the database
            id: NotSet,
            name: Set(task.name.clone()),
            description: Set(task.description.clone()),
            rule_name: Set(task.rule_name.clone()),
            status: Set(task.status.to_string()),
            counts: Set(task.counts),
            cron_spec: Set(task.cron_spec.clone()),
            recurrence_state: Set(task.recurrence_state.to_string()),
            output_type: Set(task.output_type.to_string()),
            sink_id: Set(task.sink_id),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        }
    }
}

#[async_trait]
impl TaskRepository for TaskRepositoryImpl {
    async fn create(&self, task: &Task) -> Result<Task, RepositoryError> {
        let model: task_entity::ActiveModel = task.into();

        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let model = task_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<(), RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let mut update = task_entity::Entity::update_many()
            .col_expr(task_entity::Column::UpdatedAt, Expr::value(now))
            .filter(task_entity::Column::Id.eq(id));

        if let Some(status) = patch.status {
            update = update.col_expr(task_entity::Column::Status, Expr::value(status.to_string()));
        }
        if let Some(counts) = patch.counts {
            update = update.col_expr(task_entity::Column::Counts, Expr::value(counts));
        }
        if let Some(state) = patch.recurrence_state {
            update = update.col_expr(
                task_entity::Column::RecurrenceState,
                Expr::value(state.to_string()),
            );
        }

        let result = update.exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{Task, TaskId, TaskPatch};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 任务仓库特质
///
/// 定义任务数据访问接口。单次 `update` 调用必须是原子的；
/// 同一任务的更新只来自该任务的状态监听器，不需要额外加锁。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 创建新任务，返回带有存储分配ID的任务
    async fn create(&self, task: &Task) -> Result<Task, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError>;
    /// 只更新补丁中列出的字段
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<(), RepositoryError>;
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::data_sink::DataSinkRecord;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;

/// 输出数据源仓库特质
#[async_trait]
pub trait DataSinkRepository: Send + Sync {
    /// 根据ID查找数据源
    async fn find_by_id(&self, id: i64) -> Result<Option<DataSinkRecord>, RepositoryError>;
}

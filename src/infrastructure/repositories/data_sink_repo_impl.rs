// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::data_sink::DataSinkRecord;
use crate::domain::repositories::data_sink_repository::DataSinkRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::data_sink as data_sink_entity;
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use std::sync::Arc;

/// 输出数据源仓库
///
/// 数据源由外部维护，这里只提供按ID查询
#[derive(Clone)]
pub struct DataSinkRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl DataSinkRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<data_sink_entity::Model> for DataSinkRecord {
    type Error = DbErr;

    fn try_from(model: data_sink_entity::Model) -> Result<Self, Self::Error> {
        let port = u16::try_from(model.port).map_err(|_| {
            DbErr::Custom(format!(
                "data sink {} has invalid port {}",
                model.id, model.port
            ))
        })?;

        Ok(Self {
            id: model.id,
            name: model.name,
            host: model.host,
            port,
            user: model.user,
            password: model.password,
            db_name: model.db_name,
        })
    }
}

#[async_trait]
impl DataSinkRepository for DataSinkRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> Result<Option<DataSinkRecord>, RepositoryError> {
        let model = data_sink_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(DataSinkRecord::try_from).transpose()?)
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 输出数据源表迁移
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DataSinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DataSinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DataSinks::Name).string().not_null())
                    .col(ColumnDef::new(DataSinks::Host).string().not_null())
                    .col(ColumnDef::new(DataSinks::Port).integer().not_null())
                    .col(ColumnDef::new(DataSinks::User).string().not_null())
                    .col(ColumnDef::new(DataSinks::Password).string().not_null())
                    .col(ColumnDef::new(DataSinks::DbName).string().not_null())
                    .col(
                        ColumnDef::new(DataSinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DataSinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DataSinks {
    Table,
    Id,
    Name,
    Host,
    Port,
    User,
    Password,
    DbName,
    CreatedAt,
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 迁移工具入口
///
/// 未设置 `DATABASE_URL` 时使用服务自身的 `SPIDERD__DATABASE__URL`，
/// 两者都没有时回退到服务默认的本地SQLite库。
#[async_std::main]
async fn main() {
    if std::env::var_os("DATABASE_URL").is_none() {
        let url = std::env::var("SPIDERD__DATABASE__URL")
            .unwrap_or_else(|_| "sqlite://spiderd.db?mode=rwc".to_string());
        std::env::set_var("DATABASE_URL", url);
    }

    cli::run_cli(migration::Migrator).await;
}

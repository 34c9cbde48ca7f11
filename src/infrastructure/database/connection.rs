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

use crate::config::settings::DatabaseSettings;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::{debug, warn};

/// 内存SQLite的每个连接都是独立的库，只能使用单连接
fn is_in_memory_sqlite(url: &str) -> bool {
    url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
}

/// 根据配置构造连接选项
///
/// 未配置的项保持 sea-orm 默认值。任务记录和状态监听器共用同一个连接池，
/// 内存SQLite会被限制为单连接，否则监听器可能写到另一个空库里。
pub fn connect_options(settings: &DatabaseSettings) -> ConnectOptions {
    let mut opt = ConnectOptions::new(settings.url.to_owned());
    opt.sqlx_logging(settings.log_statements);

    if is_in_memory_sqlite(&settings.url) {
        if settings.max_connections.is_some_and(|max| max > 1) {
            warn!("In-memory SQLite only supports one connection, ignoring max_connections");
        }
        opt.max_connections(1).min_connections(1);
    } else {
        if let Some(max) = settings.max_connections {
            opt.max_connections(max);
        }
        if let Some(min) = settings.min_connections {
            opt.min_connections(min);
        }
    }

    if let Some(timeout) = settings.connect_timeout.map(Duration::from_secs) {
        opt.connect_timeout(timeout).acquire_timeout(timeout);
    }
    if let Some(idle) = settings.idle_timeout {
        opt.idle_timeout(Duration::from_secs(idle));
    }
    if let Some(lifetime) = settings.max_lifetime {
        opt.max_lifetime(Duration::from_secs(lifetime));
    }

    opt
}

/// 创建数据库连接池
///
/// # 参数
///
/// * `settings` - 数据库配置
///
/// # 返回值
///
/// * `Ok(DatabaseConnection)` - 数据库连接
/// * `Err(DbErr)` - 连接过程中出现的错误
pub async fn create_pool(settings: &DatabaseSettings) -> Result<DatabaseConnection, DbErr> {
    debug!("Connecting to database (statement logging: {})", settings.log_statements);
    Database::connect(connect_options(settings)).await
}

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

use crate::domain::models::task_rule::TaskRule;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、数据库、指标、编排器、爬取引擎和任务规则等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
    /// 编排器配置
    pub orchestrator: OrchestratorSettings,
    /// 爬取引擎配置
    pub engine: EngineSettings,
    /// 预置的任务规则
    #[serde(default)]
    pub rules: Vec<TaskRule>,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 连接最长存活时间（秒）
    pub max_lifetime: Option<u64>,
    /// 是否记录SQL语句
    pub log_statements: bool,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 指标导出配置
#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: SocketAddr,
}

/// 编排器配置
#[derive(Debug, Deserialize)]
pub struct OrchestratorSettings {
    /// 每个任务完成信号通道的容量
    pub completion_buffer: usize,
}

/// 爬取引擎配置
#[derive(Debug, Deserialize)]
pub struct EngineSettings {
    /// 单个请求超时时间（秒）
    pub request_timeout: u64,
    /// 请求未指定时使用的User-Agent
    pub default_user_agent: String,
}

impl EngineSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 和 `SPIDERD__` 前缀的环境变量，后加载的覆盖先加载的
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SPIDERD").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 只包含内置默认值的配置构建器
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite://spiderd.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.max_lifetime", 1800)?
            .set_default("database.log_statements", false)?
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .set_default("orchestrator.completion_buffer", 16)?
            .set_default("engine.request_timeout", 30)?
            .set_default("engine.default_user_agent", "spiderd/0.1")
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;

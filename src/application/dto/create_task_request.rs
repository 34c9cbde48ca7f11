// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::data_sink::OutputType;
use crate::domain::models::task::{RecurrenceState, TaskId, TaskStatus};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 创建任务请求
///
/// 列表类字段（允许的域名、URL过滤规则）以逗号分隔的字符串传入，
/// 毫秒字段在组装执行配置时转换为时长。
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 64))]
    pub task_name: String,
    #[validate(length(min = 1, max = 64))]
    pub task_rule_name: String,
    #[validate(length(max = 512))]
    pub task_desc: String,
    /// 周期规则，为空表示只执行一次
    pub cron_spec: String,
    pub output_type: OutputType,
    /// 输出数据源ID（字符串形式）
    #[serde(rename = "sysdb_id")]
    pub sink_id: String,

    pub opt_user_agent: String,
    #[validate(range(max = 64))]
    pub opt_max_depth: u32,
    pub opt_allowed_domains: String,
    pub opt_url_filters: String,
    pub opt_max_body_size: usize,

    pub limit_enable: bool,
    pub limit_domain_glob: String,
    #[validate(range(max = 3_600_000))]
    pub limit_delay: u64,
    #[validate(range(max = 3_600_000))]
    pub limit_random_delay: u64,
    #[validate(range(max = 256))]
    pub limit_parallelism: usize,
}

/// 创建任务的返回结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: TaskId,
    pub created_at: DateTime<FixedOffset>,
    pub status: TaskStatus,
    pub recurrence_state: RecurrenceState,
}

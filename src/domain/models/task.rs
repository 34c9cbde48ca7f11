// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::data_sink::OutputType;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 任务标识，由存储层分配，非零
pub type TaskId = i64;

/// 任务实体
///
/// 一个用户提交的爬取任务。持久化部分只包含状态、完成次数和
/// 周期规则等字段，执行配置只保存在内存中。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// 任务唯一标识符，创建前为0
    pub id: TaskId,
    /// 任务名称
    pub name: String,
    /// 任务描述
    pub description: String,
    /// 创建时解析的规则名称
    pub rule_name: String,
    /// 任务状态
    pub status: TaskStatus,
    /// 成功完成的运行次数，只增不减
    pub counts: i64,
    /// 周期执行规则（cron表达式），为空表示只运行一次
    pub cron_spec: Option<String>,
    /// 周期触发器的注册状态
    pub recurrence_state: RecurrenceState,
    /// 输出类型
    pub output_type: OutputType,
    /// 输出数据源ID
    pub sink_id: i64,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 任务状态枚举
///
/// 状态转换：Running → Completed/Failed（每次运行结束），
/// 周期任务在下一次运行完成后再次写入；Stopped 为显式停止后的终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 运行中
    #[default]
    Running,
    /// 最近一次运行成功完成
    Completed,
    /// 最近一次运行失败
    ///
    /// 只有引擎主动发出失败信号时才会出现，不发出该信号的引擎永远不会产生此状态
    Failed,
    /// 任务已被停止，不再接收完成信号
    Stopped,
}

impl TaskStatus {
    /// 是否为成功完成信号，成功完成会使完成次数加一
    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Stopped => write!(f, "stopped"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(TaskStatus::Running),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            "stopped" => Ok(TaskStatus::Stopped),
            _ => Err(()),
        }
    }
}

/// 周期触发器状态
///
/// 注册失败不会回滚已创建的任务和已启动的首次运行，
/// 而是以 `Failed` 持久化，调用方可以据此重新提交。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceState {
    /// 没有周期规则
    #[default]
    None,
    /// 触发器已注册并启动
    Active,
    /// 触发器注册或启动失败
    Failed,
}

impl fmt::Display for RecurrenceState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecurrenceState::None => write!(f, "none"),
            RecurrenceState::Active => write!(f, "active"),
            RecurrenceState::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RecurrenceState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RecurrenceState::None),
            "active" => Ok(RecurrenceState::Active),
            "failed" => Ok(RecurrenceState::Failed),
            _ => Err(()),
        }
    }
}

impl Task {
    /// 创建一个新的任务
    ///
    /// 新任务处于 Running 状态，完成次数为0，ID由存储层在创建时分配。
    ///
    /// # 参数
    ///
    /// * `name` - 任务名称
    /// * `rule_name` - 规则名称
    /// * `output_type` - 输出类型
    /// * `sink_id` - 输出数据源ID
    pub fn new(name: String, rule_name: String, output_type: OutputType, sink_id: i64) -> Self {
        let now = Utc::now().into();
        Self {
            id: 0,
            name,
            description: String::new(),
            rule_name,
            status: TaskStatus::Running,
            counts: 0,
            cron_spec: None,
            recurrence_state: RecurrenceState::None,
            output_type,
            sink_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_cron_spec(mut self, cron_spec: Option<String>) -> Self {
        self.cron_spec = cron_spec.filter(|spec| !spec.trim().is_empty());
        self
    }

    /// 是否配置了周期执行
    pub fn is_recurring(&self) -> bool {
        self.cron_spec.is_some()
    }
}

/// 任务部分更新
///
/// 只有列在这里的字段可以被更新，其余字段（名称、规则、创建时间等）
/// 在创建后不可变。未设置的字段保持原值。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub counts: Option<i64>,
    pub recurrence_state: Option<RecurrenceState>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn counts(mut self, counts: i64) -> Self {
        self.counts = Some(counts);
        self
    }

    pub fn recurrence_state(mut self, state: RecurrenceState) -> Self {
        self.recurrence_state = Some(state);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("news".to_string(), "default".to_string(), OutputType::Csv, 7);

        assert_eq!(task.id, 0);
        assert_eq!(task.status, TaskStatus::Running);
        assert_eq!(task.counts, 0);
        assert_eq!(task.recurrence_state, RecurrenceState::None);
        assert!(!task.is_recurring());
    }

    #[test]
    fn test_blank_cron_spec_is_not_recurring() {
        let task = Task::new("news".to_string(), "default".to_string(), OutputType::Mysql, 7);

        assert!(!task.clone().with_cron_spec(Some("  ".to_string())).is_recurring());
        assert!(!task.clone().with_cron_spec(None).is_recurring());
        assert!(task
            .with_cron_spec(Some("*/5 * * * *".to_string()))
            .is_recurring());
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [
            TaskStatus::Running,
            TaskStatus::Completed,
            TaskStatus::Failed,
            TaskStatus::Stopped,
        ] {
            assert_eq!(status.to_string().parse::<TaskStatus>(), Ok(status));
        }
        assert!("paused".parse::<TaskStatus>().is_err());
    }
}

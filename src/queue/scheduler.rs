// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::execution_config::RecurrenceSpec;
use crate::domain::models::task::TaskId;
use crate::engines::launcher::JobHandle;
use async_trait::async_trait;
use dashmap::DashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info, warn};
use uuid::Uuid;

/// 调度错误类型
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// 周期规则无法解析
    #[error("Invalid recurrence spec `{spec}`: {reason}")]
    InvalidSpec { spec: String, reason: String },
    /// 句柄未注册或已启动
    #[error("Schedule {0} is not registered")]
    NotRegistered(Uuid),
    /// 底层调度器错误
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

/// 周期触发器句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleHandle {
    /// 触发器ID
    pub id: Uuid,
    /// 所属任务ID
    pub task_id: TaskId,
    /// 周期规则
    pub spec: RecurrenceSpec,
}

/// 周期调度器特质
///
/// 注册与启动分为两步：注册只校验规则并准备触发器，启动后才开始触发。
/// 每次触发都用同一个作业句柄重新启动，信号进入同一个监听器。
#[async_trait]
pub trait RecurrenceScheduler: Send + Sync {
    /// 注册周期触发器
    async fn register(
        &self,
        job: JobHandle,
        spec: &RecurrenceSpec,
    ) -> Result<ScheduleHandle, ScheduleError>;
    /// 启动已注册的触发器
    async fn start(&self, handle: &ScheduleHandle) -> Result<(), ScheduleError>;
    /// 停止触发器，之后不会再有新的运行
    async fn stop(&self, handle: &ScheduleHandle) -> Result<(), ScheduleError>;
}

/// `@every` 间隔上限（一年）
const MAX_INTERVAL_SECS: u64 = 365 * 24 * 3600;

/// 解析后的触发方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// 带秒字段的cron表达式或 `@daily` 一类的描述符
    Cron(String),
    /// 固定间隔
    Every(Duration),
}

impl Trigger {
    /// 解析周期规则
    ///
    /// 支持：
    /// - 5段标准cron（自动补上秒字段 `0`）
    /// - 6/7段带秒的cron
    /// - `@hourly`、`@daily` 等描述符
    /// - `@every 30s` / `@every 5m` / `@every 1h`
    pub fn parse(spec: &RecurrenceSpec) -> Result<Self, ScheduleError> {
        let raw = spec.as_str();
        let invalid = |reason: &str| ScheduleError::InvalidSpec {
            spec: raw.to_string(),
            reason: reason.to_string(),
        };

        if let Some(interval) = raw.strip_prefix("@every") {
            let interval = interval.trim();
            let split = interval
                .find(|c: char| !c.is_ascii_digit())
                .ok_or_else(|| invalid("missing interval unit"))?;
            let (value, unit) = interval.split_at(split);
            let value: u64 = value.parse().map_err(|_| invalid("missing interval value"))?;
            let unit_secs = match unit {
                "s" => 1,
                "m" => 60,
                "h" => 3600,
                _ => return Err(invalid("interval unit must be s, m or h")),
            };
            let seconds = value
                .checked_mul(unit_secs)
                .filter(|secs| *secs <= MAX_INTERVAL_SECS)
                .ok_or_else(|| invalid("interval must not exceed one year"))?;
            if seconds == 0 {
                return Err(invalid("interval must be positive"));
            }
            return Ok(Trigger::Every(Duration::from_secs(seconds)));
        }

        if raw.starts_with('@') {
            return Ok(Trigger::Cron(raw.to_string()));
        }

        match raw.split_whitespace().count() {
            5 => Ok(Trigger::Cron(format!("0 {}", raw))),
            6 | 7 => Ok(Trigger::Cron(raw.to_string())),
            n => Err(invalid(&format!("expected 5 to 7 fields, got {}", n))),
        }
    }
}

/// 基于 tokio-cron-scheduler 的周期调度器
///
/// 所有任务共享一个已启动的 `JobScheduler`；注册的触发器在 `start` 之前
/// 只保存在内存中，不会触发。
pub struct CronRecurrenceScheduler {
    scheduler: JobScheduler,
    pending: DashMap<Uuid, Job>,
}

impl CronRecurrenceScheduler {
    /// 创建并启动底层调度器
    pub async fn new() -> Result<Self, ScheduleError> {
        let scheduler = JobScheduler::new().await?;
        scheduler.start().await?;
        info!("Recurrence scheduler started");

        Ok(Self {
            scheduler,
            pending: DashMap::new(),
        })
    }

    /// 关闭底层调度器，所有触发器停止
    pub async fn shutdown(&self) {
        let mut scheduler = self.scheduler.clone();
        if let Err(e) = scheduler.shutdown().await {
            error!("Failed to shut down recurrence scheduler: {}", e);
        }
    }
}

fn fire(job: JobHandle) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        if job.is_orphaned() {
            warn!(
                "Skipping recurrence for task {}: listener is gone",
                job.task_id()
            );
            return;
        }

        if let Err(e) = job.relaunch().await {
            error!("Recurring run for task {} failed to launch: {}", job.task_id(), e);
        }
    })
}

#[async_trait]
impl RecurrenceScheduler for CronRecurrenceScheduler {
    async fn register(
        &self,
        job: JobHandle,
        spec: &RecurrenceSpec,
    ) -> Result<ScheduleHandle, ScheduleError> {
        let task_id = job.task_id();
        let cron_job = match Trigger::parse(spec)? {
            Trigger::Cron(expr) => {
                Job::new_async(expr.as_str(), move |_uuid, _lock| fire(job.clone()))?
            }
            Trigger::Every(interval) => {
                Job::new_repeated_async(interval, move |_uuid, _lock| fire(job.clone()))?
            }
        };

        let id = cron_job.guid();
        self.pending.insert(id, cron_job);
        info!("Registered recurrence {} for task {} ({})", id, task_id, spec);

        Ok(ScheduleHandle {
            id,
            task_id,
            spec: spec.clone(),
        })
    }

    async fn start(&self, handle: &ScheduleHandle) -> Result<(), ScheduleError> {
        let (_, cron_job) = self
            .pending
            .remove(&handle.id)
            .ok_or(ScheduleError::NotRegistered(handle.id))?;

        self.scheduler.add(cron_job).await?;
        info!(
            "Started recurrence {} for task {}",
            handle.id, handle.task_id
        );
        Ok(())
    }

    async fn stop(&self, handle: &ScheduleHandle) -> Result<(), ScheduleError> {
        if self.pending.remove(&handle.id).is_some() {
            return Ok(());
        }

        self.scheduler.remove(&handle.id).await?;
        info!(
            "Stopped recurrence {} for task {}",
            handle.id, handle.task_id
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;

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

use crate::{
    application::{
        dto::create_task_request::{CreateTaskRequest, TaskSummary},
        use_cases::config_assembler::{AssembleError, ConfigAssembler},
    },
    domain::{
        models::{
            execution_config::{ExecutionConfig, RecurrenceSpec},
            task::{RecurrenceState, Task, TaskId, TaskPatch, TaskStatus},
        },
        repositories::{
            data_sink_repository::DataSinkRepository,
            rule_repository::RuleRepository,
            task_repository::{RepositoryError, TaskRepository},
        },
        services::status_listener::{ListenerExit, StatusListener},
    },
    engines::{
        launcher::{ExecutionLauncher, JobHandle},
        traits::LaunchError,
    },
    queue::scheduler::{RecurrenceScheduler, ScheduleError, ScheduleHandle},
    utils::errors::{NotFoundError, ValidationError},
};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use validator::Validate;

#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error("Repository error: {0}")]
    Store(#[from] RepositoryError),
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),
}

impl OrchestrationError {
    /// 出错的阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            OrchestrationError::Validation(_) => "validation",
            OrchestrationError::NotFound(_) => "lookup",
            OrchestrationError::Store(_) => "store",
            OrchestrationError::Launch(_) => "launch",
            OrchestrationError::Schedule(_) => "schedule",
        }
    }
}

impl From<AssembleError> for OrchestrationError {
    fn from(err: AssembleError) -> Self {
        match err {
            AssembleError::Validation(e) => OrchestrationError::Validation(e),
            AssembleError::NotFound(e) => OrchestrationError::NotFound(e),
            AssembleError::Store(e) => OrchestrationError::Store(e),
        }
    }
}

/// 运行中任务的运行时句柄
struct TaskRuntime {
    cancel: CancellationToken,
    schedule: Option<ScheduleHandle>,
    listener: JoinHandle<ListenerExit>,
}

/// 任务编排器
///
/// 创建任务的入口：解析规则、组装配置、写入任务记录、启动首次运行、
/// 注册周期触发器，最后启动该任务唯一的状态监听器。
pub struct TaskOrchestrator<TR, SR, RR> {
    tasks: Arc<TR>,
    rules: Arc<RR>,
    assembler: ConfigAssembler<SR>,
    launcher: ExecutionLauncher,
    scheduler: Arc<dyn RecurrenceScheduler>,
    runtimes: DashMap<TaskId, TaskRuntime>,
    root_token: CancellationToken,
}

impl<TR, SR, RR> TaskOrchestrator<TR, SR, RR>
where
    TR: TaskRepository + 'static,
    SR: DataSinkRepository + 'static,
    RR: RuleRepository + 'static,
{
    pub fn new(
        tasks: Arc<TR>,
        sinks: Arc<SR>,
        rules: Arc<RR>,
        launcher: ExecutionLauncher,
        scheduler: Arc<dyn RecurrenceScheduler>,
    ) -> Self {
        Self {
            tasks,
            rules,
            assembler: ConfigAssembler::new(sinks),
            launcher,
            scheduler,
            runtimes: DashMap::new(),
            root_token: CancellationToken::new(),
        }
    }

    /// 创建并启动任务
    ///
    /// # 参数
    ///
    /// * `request` - 创建任务请求
    ///
    /// # 返回值
    ///
    /// * `Ok(TaskSummary)` - 任务ID、创建时间、状态和周期触发器状态
    /// * `Err(OrchestrationError)` - 任一阶段失败。启动失败时已创建的任务记录会被标记为失败
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
    ) -> Result<TaskSummary, OrchestrationError> {
        request
            .validate()
            .map_err(|e| ValidationError::InvalidRequest(e.to_string()))?;

        self.prune_finished().await;

        let rule = self
            .rules
            .resolve(&request.task_rule_name)
            .await
            .ok_or_else(|| NotFoundError::RuleNotFound(request.task_rule_name.clone()))?;

        let config = Arc::new(self.assembler.assemble(&request, &rule).await?);

        let task = Task::new(
            request.task_name,
            rule.name.clone(),
            request.output_type,
            config.output().sink.id,
        )
        .with_description(request.task_desc)
        .with_cron_spec(config.recurrence().map(|spec| spec.to_string()));
        let mut task = self.tasks.create(&task).await?;
        info!("Task {} ({}) created", task.id, task.name);

        let (job, completions) = match self.launcher.launch(task.id, rule, config.clone()).await {
            Ok(launched) => launched,
            Err(e) => {
                error!("Failed to launch task {}: {}", task.id, e);
                self.mark_orphaned(task.id).await;
                return Err(e.into());
            }
        };

        let (recurrence_state, schedule) = self.schedule(job, &config).await;
        task.recurrence_state = recurrence_state;
        if task.is_recurring() {
            let patch = TaskPatch::new().recurrence_state(task.recurrence_state);
            if let Err(e) = self.tasks.update(task.id, &patch).await {
                warn!(
                    "Failed to record recurrence state of task {}: {}",
                    task.id, e
                );
            }
        }

        let cancel = self.root_token.child_token();
        let listener =
            StatusListener::new(&task, self.tasks.clone()).spawn(completions, cancel.clone());
        self.runtimes.insert(
            task.id,
            TaskRuntime {
                cancel,
                schedule,
                listener,
            },
        );

        metrics::counter!("spiderd_tasks_created_total").increment(1);

        Ok(TaskSummary {
            id: task.id,
            created_at: task.created_at,
            status: task.status,
            recurrence_state: task.recurrence_state,
        })
    }

    /// 停止任务
    ///
    /// 先停止周期触发器，再取消监听器并等待它写入最终的 `Stopped` 状态。
    pub async fn stop_task(&self, id: TaskId) -> Result<(), OrchestrationError> {
        let (_, runtime) = self
            .runtimes
            .remove(&id)
            .ok_or(NotFoundError::TaskNotFound(id))?;

        let stopped = self.stop_schedule(runtime.schedule.as_ref()).await;

        if runtime.listener.is_finished() {
            return Err(NotFoundError::TaskNotFound(id).into());
        }

        runtime.cancel.cancel();
        match runtime.listener.await {
            Ok(exit) => info!("Task {} stopped, listener exit: {}", id, exit.reason()),
            Err(e) => error!("Listener of task {} panicked: {}", id, e),
        }

        stopped.map_err(Into::into)
    }

    /// 停止所有任务，进程退出前调用
    pub async fn shutdown(&self) {
        info!("Stopping {} active tasks", self.runtimes.len());
        self.root_token.cancel();

        let ids: Vec<TaskId> = self.runtimes.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some((_, runtime)) = self.runtimes.remove(&id) {
                if let Err(e) = self.stop_schedule(runtime.schedule.as_ref()).await {
                    warn!("Failed to stop recurrence of task {}: {}", id, e);
                }
                if let Err(e) = runtime.listener.await {
                    error!("Listener of task {} panicked: {}", id, e);
                }
            }
        }
    }

    /// 当前仍有监听器在运行的任务数量
    pub fn active_tasks(&self) -> usize {
        self.runtimes
            .iter()
            .filter(|entry| !entry.listener.is_finished())
            .count()
    }

    /// 注册并启动周期触发器，返回触发器状态
    ///
    /// 非周期任务直接丢弃作业句柄，首次运行结束后信号源随之关闭。
    async fn schedule(
        &self,
        job: JobHandle,
        config: &ExecutionConfig,
    ) -> (RecurrenceState, Option<ScheduleHandle>) {
        let Some(spec) = config.recurrence() else {
            return (RecurrenceState::None, None);
        };

        let task_id = job.task_id();
        match self.register_and_start(job, spec).await {
            Ok(handle) => {
                info!("Recurrence `{}` active for task {}", spec, task_id);
                (RecurrenceState::Active, Some(handle))
            }
            Err(e) => {
                error!("Failed to schedule task {} with `{}`: {}", task_id, spec, e);
                (RecurrenceState::Failed, None)
            }
        }
    }

    async fn register_and_start(
        &self,
        job: JobHandle,
        spec: &RecurrenceSpec,
    ) -> Result<ScheduleHandle, ScheduleError> {
        let handle = self.scheduler.register(job, spec).await?;
        if let Err(e) = self.scheduler.start(&handle).await {
            // drop the registered trigger so it can never fire
            let _ = self.scheduler.stop(&handle).await;
            return Err(e);
        }
        Ok(handle)
    }

    async fn stop_schedule(&self, handle: Option<&ScheduleHandle>) -> Result<(), ScheduleError> {
        match handle {
            Some(handle) => self.scheduler.stop(handle).await,
            None => Ok(()),
        }
    }

    /// 首次启动失败后任务没有任何作业，标记为失败
    async fn mark_orphaned(&self, id: TaskId) {
        let patch = TaskPatch::new().status(TaskStatus::Failed);
        if let Err(e) = self.tasks.update(id, &patch).await {
            warn!("Failed to mark orphaned task {} as failed: {}", id, e);
        }
    }

    /// 清理监听器已退出的任务，并停止它们残留的周期触发器
    async fn prune_finished(&self) {
        let finished: Vec<TaskId> = self
            .runtimes
            .iter()
            .filter(|entry| entry.listener.is_finished())
            .map(|entry| *entry.key())
            .collect();

        for id in finished {
            if let Some((_, runtime)) = self.runtimes.remove(&id) {
                if let Err(e) = self.stop_schedule(runtime.schedule.as_ref()).await {
                    warn!("Failed to stop recurrence of finished task {}: {}", id, e);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "task_orchestrator_test.rs"]
mod tests;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{Task, TaskId, TaskPatch, TaskStatus};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::queue::completion::CompletionReceiver;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 监听器退出原因
#[derive(Debug)]
pub enum ListenerExit {
    /// 被显式取消（停止任务或进程关闭）
    Cancelled,
    /// 所有发送端都已释放，不会再有信号
    SourceClosed,
    /// 持久化失败，后续信号不再处理
    StoreFailed(RepositoryError),
}

impl ListenerExit {
    pub fn reason(&self) -> &'static str {
        match self {
            ListenerExit::Cancelled => "cancelled",
            ListenerExit::SourceClosed => "source_closed",
            ListenerExit::StoreFailed(_) => "store_failed",
        }
    }
}

/// 任务在内存中的进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskProgress {
    pub status: TaskStatus,
    pub counts: i64,
}

impl TaskProgress {
    /// 应用一个完成信号，返回需要持久化的补丁
    pub fn apply(&mut self, signal: TaskStatus) -> TaskPatch {
        self.status = signal;
        if signal.is_success() {
            self.counts += 1;
        }
        TaskPatch::new().status(self.status).counts(self.counts)
    }
}

/// 任务状态监听器
///
/// 每个任务只有一个监听器，在首次启动后立即开始，独占该任务的完成信号，
/// 并且是运行期间唯一更新任务状态和完成次数的地方。
pub struct StatusListener<R>
where
    R: TaskRepository + 'static,
{
    task_id: TaskId,
    repository: Arc<R>,
    progress: TaskProgress,
}

impl<R> StatusListener<R>
where
    R: TaskRepository + 'static,
{
    /// 以任务当前的状态和完成次数创建监听器
    pub fn new(task: &Task, repository: Arc<R>) -> Self {
        Self {
            task_id: task.id,
            repository,
            progress: TaskProgress {
                status: task.status,
                counts: task.counts,
            },
        }
    }

    /// 在后台启动监听器
    ///
    /// 接收端按值传入，启动后不能再被其他消费者使用。
    pub fn spawn(
        self,
        completions: CompletionReceiver,
        cancel: CancellationToken,
    ) -> JoinHandle<ListenerExit> {
        tokio::spawn(self.run(completions, cancel))
    }

    /// 运行监听循环直到被取消、信号源关闭或持久化失败
    pub async fn run(
        mut self,
        mut completions: CompletionReceiver,
        cancel: CancellationToken,
    ) -> ListenerExit {
        info!("Status listener started for task {}", self.task_id);

        let exit = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.persist_stopped(&mut completions).await;
                    break ListenerExit::Cancelled;
                }
                signal = completions.recv() => match signal {
                    Some(status) => {
                        if let Err(e) = self.handle(status).await {
                            error!(
                                "Failed to update status of task {}, listener stops: {}",
                                self.task_id, e
                            );
                            break ListenerExit::StoreFailed(e);
                        }
                    }
                    None => break ListenerExit::SourceClosed,
                },
            }
        };

        metrics::counter!("spiderd_listener_exits_total", "reason" => exit.reason()).increment(1);
        info!(
            "Status listener for task {} exited ({}), counts={}",
            self.task_id,
            exit.reason(),
            self.progress.counts
        );
        exit
    }

    async fn handle(&mut self, status: TaskStatus) -> Result<(), RepositoryError> {
        let patch = self.progress.apply(status);
        debug!(
            "Task {} signalled {}, counts={}",
            self.task_id, status, self.progress.counts
        );
        metrics::counter!("spiderd_task_runs_total", "status" => status.to_string()).increment(1);

        self.repository.update(self.task_id, &patch).await
    }

    /// 先计入已缓冲的信号，再写入最终的 `Stopped` 状态
    async fn persist_stopped(&mut self, completions: &mut CompletionReceiver) {
        while let Some(status) = completions.try_recv() {
            self.progress.apply(status);
            metrics::counter!("spiderd_task_runs_total", "status" => status.to_string())
                .increment(1);
            debug!(
                "Task {} drained {} before stopping, counts={}",
                self.task_id, status, self.progress.counts
            );
        }

        self.progress.status = TaskStatus::Stopped;
        let patch = TaskPatch::new()
            .status(TaskStatus::Stopped)
            .counts(self.progress.counts);

        if let Err(e) = self.repository.update(self.task_id, &patch).await {
            warn!("Failed to mark task {} as stopped: {}", self.task_id, e);
        }
    }
}

#[cfg(test)]
#[path = "status_listener_test.rs"]
mod tests;

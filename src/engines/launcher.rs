// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::execution_config::ExecutionConfig;
use crate::domain::models::task::TaskId;
use crate::domain::models::task_rule::TaskRule;
use crate::engines::traits::{CrawlEngine, CrawlRun, LaunchError};
use crate::queue::completion::{completion_channel, CompletionReceiver, CompletionSender};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 执行启动器
///
/// 为任务创建完成信号通道并启动首次运行
#[derive(Clone)]
pub struct ExecutionLauncher {
    engine: Arc<dyn CrawlEngine>,
    completion_buffer: usize,
}

impl ExecutionLauncher {
    /// 创建新的执行启动器
    ///
    /// # 参数
    ///
    /// * `engine` - 爬取引擎
    /// * `completion_buffer` - 完成信号通道容量
    pub fn new(engine: Arc<dyn CrawlEngine>, completion_buffer: usize) -> Self {
        Self {
            engine,
            completion_buffer,
        }
    }

    /// 启动任务的首次运行
    ///
    /// # 返回值
    ///
    /// * `Ok((JobHandle, CompletionReceiver))` - 可重复启动的作业句柄和唯一的信号接收端
    /// * `Err(LaunchError)` - 引擎拒绝启动，此时不会产生任何信号
    pub async fn launch(
        &self,
        task_id: TaskId,
        rule: Arc<TaskRule>,
        config: Arc<ExecutionConfig>,
    ) -> Result<(JobHandle, CompletionReceiver), LaunchError> {
        let (completions, receiver) = completion_channel(self.completion_buffer);
        let job = JobHandle {
            task_id,
            engine: self.engine.clone(),
            rule,
            config,
            completions,
        };

        job.relaunch().await?;
        info!(
            "Task {} launched on engine {} with rule {}",
            task_id,
            self.engine.name(),
            job.rule.name
        );

        Ok((job, receiver))
    }
}

/// 作业句柄
///
/// 持有一次任务运行所需的全部输入。克隆后的句柄共享同一个信号发送端，
/// 周期触发器用它重复启动，信号都会送到同一个监听器。
#[derive(Clone)]
pub struct JobHandle {
    task_id: TaskId,
    engine: Arc<dyn CrawlEngine>,
    rule: Arc<TaskRule>,
    config: Arc<ExecutionConfig>,
    completions: CompletionSender,
}

impl JobHandle {
    /// 使用相同的规则和配置再启动一次运行
    pub async fn relaunch(&self) -> Result<(), LaunchError> {
        debug!("Starting run for task {}", self.task_id);
        metrics::counter!("spiderd_task_runs_started_total").increment(1);

        self.engine
            .launch(CrawlRun {
                task_id: self.task_id,
                rule: self.rule.clone(),
                config: self.config.clone(),
                completions: self.completions.clone(),
            })
            .await
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// 监听器已退出时，后续运行的信号不会再被处理
    pub fn is_orphaned(&self) -> bool {
        self.completions.is_closed()
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("task_id", &self.task_id)
            .field("engine", &self.engine.name())
            .field("rule", &self.rule.name)
            .finish()
    }
}

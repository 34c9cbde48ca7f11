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

use crate::domain::models::execution_config::ExecutionConfig;
use crate::domain::models::task::TaskId;
use crate::domain::models::task_rule::TaskRule;
use crate::queue::completion::CompletionSender;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// 启动错误类型
#[derive(Error, Debug)]
pub enum LaunchError {
    /// 引擎拒绝了该配置
    #[error("Engine rejected configuration: {0}")]
    Rejected(String),
    /// 引擎不可用
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
}

/// 一次运行的输入
///
/// 规则与配置都是共享只读的；`completions` 用于在运行结束时发送一次状态。
#[derive(Debug, Clone)]
pub struct CrawlRun {
    /// 所属任务ID
    pub task_id: TaskId,
    /// 任务规则
    pub rule: Arc<TaskRule>,
    /// 执行配置
    pub config: Arc<ExecutionConfig>,
    /// 完成信号发送端
    pub completions: CompletionSender,
}

/// 爬取引擎特质
///
/// `launch` 只做初始化检查，爬取本身必须在调用方之外异步执行，
/// 并在每次运行结束时通过 `completions` 恰好发送一次状态。
#[async_trait]
pub trait CrawlEngine: Send + Sync {
    /// 启动一次运行
    async fn launch(&self, run: CrawlRun) -> Result<(), LaunchError>;

    /// 获取引擎名称
    fn name(&self) -> &'static str;
}

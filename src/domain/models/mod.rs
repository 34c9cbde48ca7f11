// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 任务（task）：持久化的任务记录、状态与部分更新
/// - 任务规则（task_rule）：按名称注册的默认爬取行为
/// - 输出数据源（data_sink）：输出目标的连接信息
/// - 执行配置（execution_config）：一次运行所需的不可变配置
pub mod data_sink;
pub mod execution_config;
pub mod task;
pub mod task_rule;

#[cfg(test)]
pub mod fixtures;

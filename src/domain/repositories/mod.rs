// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 任务仓库（task_repository）：任务记录的创建与部分更新
/// - 数据源仓库（data_sink_repository）：输出数据源的查找
/// - 规则仓库（rule_repository）：按名称解析任务规则
pub mod data_sink_repository;
pub mod rule_repository;
pub mod task_repository;

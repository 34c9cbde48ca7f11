// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的具体实现：任务和数据源基于SeaORM，
/// 任务规则保存在内存注册表中
pub mod data_sink_repo_impl;
pub mod rule_registry;
pub mod task_repo_impl;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task_rule::TaskRule;
use async_trait::async_trait;
use std::sync::Arc;

/// 规则仓库特质
///
/// 规则是只读的，查找没有副作用。
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// 按名称解析规则
    async fn resolve(&self, name: &str) -> Option<Arc<TaskRule>>;
    /// 列出所有已注册的规则名称
    async fn list(&self) -> Vec<String>;
}

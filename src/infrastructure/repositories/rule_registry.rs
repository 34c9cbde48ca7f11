// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task_rule::TaskRule;
use crate::domain::repositories::rule_repository::RuleRepository;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RuleRegistryError {
    #[error("task rule `{0}` is already registered")]
    Duplicate(String),
    #[error("task rule name must not be empty")]
    EmptyName,
}

/// 内存中的任务规则注册表
///
/// 启动时从配置中的 `[[rules]]` 加载，注册后规则不可修改
#[derive(Default)]
pub struct RuleRegistry {
    rules: DashMap<String, Arc<TaskRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从规则列表构建注册表，遇到重名规则即失败
    pub fn from_rules(rules: impl IntoIterator<Item = TaskRule>) -> Result<Self, RuleRegistryError> {
        let registry = Self::new();
        for rule in rules {
            registry.register(rule)?;
        }
        Ok(registry)
    }

    pub fn register(&self, rule: TaskRule) -> Result<(), RuleRegistryError> {
        let name = rule.name.trim().to_string();
        if name.is_empty() {
            return Err(RuleRegistryError::EmptyName);
        }

        match self.rules.entry(name.clone()) {
            Entry::Occupied(_) => Err(RuleRegistryError::Duplicate(name)),
            Entry::Vacant(slot) => {
                info!("Registered task rule {}", name);
                slot.insert(Arc::new(rule));
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[async_trait]
impl RuleRepository for RuleRegistry {
    async fn resolve(&self, name: &str) -> Option<Arc<TaskRule>> {
        self.rules.get(name).map(|rule| rule.value().clone())
    }

    async fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }
}

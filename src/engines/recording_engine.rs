// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::TaskStatus;
use crate::engines::traits::{CrawlEngine, CrawlRun, LaunchError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 测试用引擎：记录启动次数，每次运行立即发出固定的完成状态
pub struct RecordingEngine {
    launches: Arc<AtomicUsize>,
    outcome: TaskStatus,
    reject: bool,
}

impl RecordingEngine {
    pub fn completing() -> Self {
        Self {
            launches: Arc::new(AtomicUsize::new(0)),
            outcome: TaskStatus::Completed,
            reject: false,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::completing()
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CrawlEngine for RecordingEngine {
    async fn launch(&self, run: CrawlRun) -> Result<(), LaunchError> {
        if self.reject {
            return Err(LaunchError::Rejected("rejected by test engine".to_string()));
        }

        self.launches.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome;
        tokio::spawn(async move {
            run.completions.send(outcome).await;
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

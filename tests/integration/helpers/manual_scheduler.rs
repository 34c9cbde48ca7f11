// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use spiderd::domain::models::execution_config::RecurrenceSpec;
use spiderd::engines::launcher::JobHandle;
use spiderd::queue::scheduler::{RecurrenceScheduler, ScheduleError, ScheduleHandle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// 手动触发的周期调度器
///
/// 只记录注册的作业，由测试调用 `fire` 模拟一次触发
#[derive(Default)]
pub struct ManualScheduler {
    jobs: Mutex<Vec<JobHandle>>,
    reject_register: bool,
    pub registered: AtomicUsize,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
}

#[allow(dead_code)]
impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject_register: true,
            ..Self::default()
        }
    }

    /// 触发所有已注册的作业一次
    pub async fn fire(&self) {
        let jobs: Vec<JobHandle> = self.jobs.lock().unwrap().clone();
        for job in jobs {
            job.relaunch().await.unwrap();
        }
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecurrenceScheduler for ManualScheduler {
    async fn register(
        &self,
        job: JobHandle,
        spec: &RecurrenceSpec,
    ) -> Result<ScheduleHandle, ScheduleError> {
        self.registered.fetch_add(1, Ordering::SeqCst);
        if self.reject_register {
            return Err(ScheduleError::InvalidSpec {
                spec: spec.to_string(),
                reason: "rejected by test scheduler".to_string(),
            });
        }

        let handle = ScheduleHandle {
            id: Uuid::new_v4(),
            task_id: job.task_id(),
            spec: spec.clone(),
        };
        self.jobs.lock().unwrap().push(job);
        Ok(handle)
    }

    async fn start(&self, _handle: &ScheduleHandle) -> Result<(), ScheduleError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self, _handle: &ScheduleHandle) -> Result<(), ScheduleError> {
        self.stopped.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().unwrap().clear();
        Ok(())
    }
}

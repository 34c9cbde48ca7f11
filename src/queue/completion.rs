// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::TaskStatus;
use tokio::sync::mpsc;

/// 创建完成信号通道
///
/// 每个任务一个通道：首次运行与后续周期运行共享发送端的克隆，
/// 接收端只有一个，由该任务的状态监听器独占。
///
/// # 参数
///
/// * `buffer` - 通道容量，至少为1
pub fn completion_channel(buffer: usize) -> (CompletionSender, CompletionReceiver) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (CompletionSender { tx }, CompletionReceiver { rx })
}

/// 完成信号发送端
#[derive(Debug, Clone)]
pub struct CompletionSender {
    tx: mpsc::Sender<TaskStatus>,
}

impl CompletionSender {
    /// 发送一次运行的结束状态
    ///
    /// # 返回值
    ///
    /// 监听器已退出时返回false，信号被丢弃
    pub async fn send(&self, status: TaskStatus) -> bool {
        self.tx.send(status).await.is_ok()
    }

    /// 监听器是否已退出
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// 完成信号接收端
///
/// 不可克隆，只能被一个状态监听器按值取走，从而保证每个任务只有一个消费者。
#[derive(Debug)]
pub struct CompletionReceiver {
    rx: mpsc::Receiver<TaskStatus>,
}

impl CompletionReceiver {
    /// 等待下一个信号，所有发送端都被释放后返回None
    pub async fn recv(&mut self) -> Option<TaskStatus> {
        self.rx.recv().await
    }

    /// 取出一个已在缓冲区中的信号，不等待
    pub fn try_recv(&mut self) -> Option<TaskStatus> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signals_arrive_in_emission_order() {
        let (tx, mut rx) = completion_channel(4);
        let second = tx.clone();

        assert!(tx.send(TaskStatus::Completed).await);
        assert!(second.send(TaskStatus::Failed).await);
        assert!(tx.send(TaskStatus::Completed).await);

        assert_eq!(rx.recv().await, Some(TaskStatus::Completed));
        assert_eq!(rx.recv().await, Some(TaskStatus::Failed));
        assert_eq!(rx.recv().await, Some(TaskStatus::Completed));
    }

    #[tokio::test]
    async fn test_receiver_sees_close_after_all_senders_dropped() {
        let (tx, mut rx) = completion_channel(1);
        let clone = tx.clone();
        drop(tx);
        assert!(clone.send(TaskStatus::Completed).await);
        drop(clone);

        assert_eq!(rx.recv().await, Some(TaskStatus::Completed));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_try_recv_only_returns_buffered_signals() {
        let (tx, mut rx) = completion_channel(2);
        assert_eq!(rx.try_recv(), None);

        assert!(tx.send(TaskStatus::Completed).await);
        assert_eq!(rx.try_recv(), Some(TaskStatus::Completed));
        assert_eq!(rx.try_recv(), None);
    }

    #[tokio::test]
    async fn test_send_reports_dropped_receiver() {
        let (tx, rx) = completion_channel(0);
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.send(TaskStatus::Completed).await);
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 信号与调度模块
///
/// - completion：任务完成信号通道，多个发送端、唯一的接收端
/// - scheduler：周期触发器
pub mod completion;
pub mod scheduler;

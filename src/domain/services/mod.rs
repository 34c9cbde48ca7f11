// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 状态监听（status_listener）：消费任务的完成信号并持久化状态和完成次数
/// - 链接发现（link_discoverer）：从页面中提取并过滤待爬取的链接
pub mod link_discoverer;
pub mod status_listener;

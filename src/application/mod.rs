// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含任务编排用例和请求/响应对象，
/// 协调领域服务与基础设施完成一次完整的任务创建流程
pub mod dto;
pub mod use_cases;

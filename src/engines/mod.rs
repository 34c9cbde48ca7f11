// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 爬取引擎模块
///
/// - traits：引擎接口和单次运行的输入
/// - launcher：执行启动器和可重复启动的作业句柄
/// - reqwest_engine：基于reqwest的广度优先爬取引擎
pub mod launcher;
#[cfg(test)]
pub mod recording_engine;
pub mod reqwest_engine;
pub mod traits;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::TaskId;
use thiserror::Error;

/// 校验错误
///
/// 请求字段不合法或无法解析时产生，对应调用方的输入问题
#[derive(Error, Debug)]
pub enum ValidationError {
    /// 请求字段校验失败
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// URL过滤规则无法编译
    #[error("invalid url filter pattern `{pattern}`: {source}")]
    InvalidFilterPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// 限速域名通配符无法转换
    #[error("invalid limit domain glob `{pattern}`: {source}")]
    InvalidDomainGlob {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// 数据源ID不是合法数字
    #[error("invalid sink id `{0}`")]
    InvalidSinkId(String),
}

/// 未找到错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("task rule `{0}` not found")]
    RuleNotFound(String),

    #[error("data sink {0} not found")]
    SinkNotFound(i64),

    #[error("task {0} not found or no longer active")]
    TaskNotFound(TaskId),
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::create_task_request::CreateTaskRequest;
use crate::domain::models::execution_config::{
    CrawlOptions, DomainGlob, ExecutionConfig, OutputConfig, RateLimit, RecurrenceSpec,
};
use crate::domain::models::task_rule::TaskRule;
use crate::domain::repositories::data_sink_repository::DataSinkRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::utils::errors::{NotFoundError, ValidationError};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// 组装执行配置时的错误
#[derive(Error, Debug)]
pub enum AssembleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error("Repository error: {0}")]
    Store(#[from] RepositoryError),
}

/// 执行配置组装器
///
/// 把请求、规则和输出数据源合并成一份不可变的执行配置。
/// 规则中的行为开关原样复制，请求不能覆盖。
pub struct ConfigAssembler<SR> {
    sinks: Arc<SR>,
}

impl<SR> ConfigAssembler<SR>
where
    SR: DataSinkRepository + 'static,
{
    pub fn new(sinks: Arc<SR>) -> Self {
        Self { sinks }
    }

    /// 组装执行配置
    ///
    /// 请求应已通过字段校验。过滤规则和限速通配符在查询数据源之前编译。
    ///
    /// # 参数
    ///
    /// * `request` - 创建任务请求
    /// * `rule` - 已解析的任务规则
    ///
    /// # 返回值
    ///
    /// * `Ok(ExecutionConfig)` - 组装完成的执行配置
    /// * `Err(AssembleError)` - 数据源ID不合法、过滤规则无法编译、数据源不存在或查询失败
    pub async fn assemble(
        &self,
        request: &CreateTaskRequest,
        rule: &TaskRule,
    ) -> Result<ExecutionConfig, AssembleError> {
        let sink_id = parse_sink_id(&request.sink_id)?;
        let allowed_domains: HashSet<String> =
            split_list(&request.opt_allowed_domains).map(str::to_string).collect();
        let url_filters = compile_filters(&request.opt_url_filters)?;
        let domain_glob = DomainGlob::new(&request.limit_domain_glob).map_err(|source| {
            ValidationError::InvalidDomainGlob {
                pattern: request.limit_domain_glob.clone(),
                source,
            }
        })?;

        let sink = self
            .sinks
            .find_by_id(sink_id)
            .await?
            .ok_or(NotFoundError::SinkNotFound(sink_id))?;

        debug!(
            "Assembling config for task {} with rule {} and sink {}",
            request.task_name, rule.name, sink.id
        );

        let options = CrawlOptions {
            user_agent: request.opt_user_agent.trim().to_string(),
            max_depth: request.opt_max_depth,
            allowed_domains,
            url_filters,
            allow_url_revisit: rule.allow_url_revisit,
            ignore_robots_txt: rule.ignore_robots_txt,
            parse_http_error_response: rule.parse_http_error_response,
            disable_cookies: rule.disable_cookies,
            max_body_size: request.opt_max_body_size,
        };

        let limit = RateLimit {
            enabled: request.limit_enable,
            domain_glob,
            delay: Duration::from_millis(request.limit_delay),
            random_delay: Duration::from_millis(request.limit_random_delay),
            parallelism: request.limit_parallelism,
        };

        let output = OutputConfig {
            output_type: request.output_type,
            sink,
        };

        Ok(ExecutionConfig::new(
            RecurrenceSpec::parse(&request.cron_spec),
            options,
            limit,
            output,
        ))
    }
}

/// 拆分逗号分隔的列表，去掉首尾空白并跳过空项
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// 编译URL过滤规则，遇到第一个非法规则即返回错误
fn compile_filters(raw: &str) -> Result<Vec<Regex>, ValidationError> {
    split_list(raw)
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ValidationError::InvalidFilterPattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}

fn parse_sink_id(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidSinkId(raw.to_string()))
}

#[cfg(test)]
#[path = "config_assembler_test.rs"]
mod tests;

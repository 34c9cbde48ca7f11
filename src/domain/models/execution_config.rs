// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::data_sink::{DataSinkRecord, OutputType};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// 执行配置
///
/// 由请求、规则和输出数据源组装而成，构造后不可变。每次运行（包括周期
/// 触发的重复运行）共享同一份配置，只读不写。
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    recurrence: Option<RecurrenceSpec>,
    options: CrawlOptions,
    limit: RateLimit,
    output: OutputConfig,
}

impl ExecutionConfig {
    pub fn new(
        recurrence: Option<RecurrenceSpec>,
        options: CrawlOptions,
        limit: RateLimit,
        output: OutputConfig,
    ) -> Self {
        Self {
            recurrence,
            options,
            limit,
            output,
        }
    }

    pub fn recurrence(&self) -> Option<&RecurrenceSpec> {
        self.recurrence.as_ref()
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    pub fn limit(&self) -> &RateLimit {
        &self.limit
    }

    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}

/// 周期执行规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSpec(String);

impl RecurrenceSpec {
    /// 空白字符串视为没有周期规则
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            None
        } else {
            Some(Self(spec.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecurrenceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 爬取行为选项
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// User-Agent
    pub user_agent: String,
    /// 最大爬取深度，0表示不限制
    pub max_depth: u32,
    /// 允许的域名，为空表示不限制
    pub allowed_domains: HashSet<String>,
    /// URL过滤规则，为空表示不过滤
    pub url_filters: Vec<Regex>,
    /// 是否允许重复访问（来自规则）
    pub allow_url_revisit: bool,
    /// 是否忽略robots.txt（来自规则）
    pub ignore_robots_txt: bool,
    /// 是否解析HTTP错误响应（来自规则）
    pub parse_http_error_response: bool,
    /// 是否禁用Cookie（来自规则）
    pub disable_cookies: bool,
    /// 响应体最大字节数，0表示不限制
    pub max_body_size: usize,
}

impl CrawlOptions {
    /// 判断域名是否允许访问
    pub fn is_domain_allowed(&self, host: &str) -> bool {
        self.allowed_domains.is_empty() || self.allowed_domains.contains(host)
    }

    /// 判断URL是否通过过滤规则，任一规则匹配即通过
    pub fn matches_url_filters(&self, url: &str) -> bool {
        self.url_filters.is_empty() || self.url_filters.iter().any(|re| re.is_match(url))
    }
}

/// 限速配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimit {
    /// 是否启用
    pub enabled: bool,
    /// 生效的域名通配符
    pub domain_glob: DomainGlob,
    /// 请求间隔
    pub delay: Duration,
    /// 额外随机间隔上限
    pub random_delay: Duration,
    /// 并发数
    pub parallelism: usize,
}

impl RateLimit {
    /// 判断限速规则是否作用于该域名
    pub fn applies_to(&self, host: &str) -> bool {
        self.enabled && self.domain_glob.matches(host)
    }
}

/// 输出配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// 输出类型
    pub output_type: OutputType,
    /// 已解析的数据源连接信息
    pub sink: DataSinkRecord,
}

/// 域名通配符，支持 `*` 与 `?`
///
/// 组装配置时转换为锚定的正则表达式，空模式匹配所有域名。
#[derive(Debug, Clone)]
pub struct DomainGlob {
    pattern: String,
    regex: Option<Regex>,
}

impl DomainGlob {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(Self::any());
        }

        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        for c in pattern.chars() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                c => expr.push_str(&regex::escape(&c.to_string())),
            }
        }
        expr.push('$');

        Ok(Self {
            pattern: pattern.to_string(),
            regex: Some(Regex::new(&expr)?),
        })
    }

    /// 匹配所有域名
    pub fn any() -> Self {
        Self {
            pattern: String::new(),
            regex: None,
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(host),
            None => true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl PartialEq for DomainGlob {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for DomainGlob {}

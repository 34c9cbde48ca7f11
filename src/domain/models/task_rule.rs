// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 任务规则
///
/// 按名称注册的一组默认爬取行为。规则中的行为开关不能被单个请求覆盖，
/// 组装执行配置时原样复制。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRule {
    /// 规则名称，全局唯一
    pub name: String,
    /// 规则描述
    #[serde(default)]
    pub description: String,
    /// 起始URL
    #[serde(default)]
    pub seed_urls: Vec<String>,
    /// 是否允许重复访问同一URL
    #[serde(default)]
    pub allow_url_revisit: bool,
    /// 是否忽略robots.txt
    #[serde(default)]
    pub ignore_robots_txt: bool,
    /// 是否解析HTTP错误响应
    #[serde(default)]
    pub parse_http_error_response: bool,
    /// 是否禁用Cookie
    #[serde(default)]
    pub disable_cookies: bool,
}

impl TaskRule {
    /// 创建一个不带任何特殊行为的规则
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            seed_urls: Vec::new(),
            allow_url_revisit: false,
            ignore_robots_txt: false,
            parse_http_error_response: false,
            disable_cookies: false,
        }
    }

    pub fn with_seed_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_urls = urls.into_iter().map(Into::into).collect();
        self
    }
}

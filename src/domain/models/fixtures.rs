// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 单元测试共用的领域对象

use crate::domain::models::data_sink::{DataSinkRecord, OutputType};
use crate::domain::models::execution_config::{
    CrawlOptions, DomainGlob, ExecutionConfig, OutputConfig, RateLimit, RecurrenceSpec,
};
use crate::domain::models::task_rule::TaskRule;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

pub fn sample_rule() -> Arc<TaskRule> {
    Arc::new(TaskRule::new("default").with_seed_urls(["https://example.com/"]))
}

pub fn sample_sink() -> DataSinkRecord {
    DataSinkRecord {
        id: 7,
        name: "warehouse".to_string(),
        host: "127.0.0.1".to_string(),
        port: 3306,
        user: "spider".to_string(),
        password: "secret".to_string(),
        db_name: "crawl".to_string(),
    }
}

pub fn sample_config(recurrence: Option<&str>) -> Arc<ExecutionConfig> {
    Arc::new(ExecutionConfig::new(
        recurrence.and_then(RecurrenceSpec::parse),
        CrawlOptions {
            user_agent: "spiderd-test".to_string(),
            max_depth: 1,
            allowed_domains: HashSet::new(),
            url_filters: Vec::new(),
            allow_url_revisit: false,
            ignore_robots_txt: true,
            parse_http_error_response: false,
            disable_cookies: false,
            max_body_size: 0,
        },
        RateLimit {
            enabled: false,
            domain_glob: DomainGlob::any(),
            delay: Duration::ZERO,
            random_delay: Duration::ZERO,
            parallelism: 1,
        },
        OutputConfig {
            output_type: OutputType::Mysql,
            sink: sample_sink(),
        },
    ))
}

// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::settings::EngineSettings;
use crate::domain::models::execution_config::{CrawlOptions, ExecutionConfig, RateLimit};
use crate::domain::models::task::{TaskId, TaskStatus};
use crate::domain::services::link_discoverer::LinkDiscoverer;
use crate::engines::traits::{CrawlEngine, CrawlRun, LaunchError};
use crate::utils::robots::{RobotsChecker, RobotsCheckerTrait};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use rand::Rng;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// 未启用限速时每层的并发请求数
const DEFAULT_PARALLELISM: usize = 4;

/// 单次运行最多抓取的页面数
const MAX_PAGES_PER_RUN: usize = 10_000;

/// 爬取引擎
///
/// 基于reqwest实现的广度优先爬取引擎。每次运行从规则的起始URL出发，
/// 按执行配置控制深度、域名、URL过滤、robots.txt、Cookie和限速，
/// 运行结束后发送一次完成信号。抓取到的页面只记录日志。
pub struct ReqwestEngine {
    request_timeout: Duration,
    default_user_agent: String,
    robots: Arc<dyn RobotsCheckerTrait>,
}

impl ReqwestEngine {
    /// 创建爬取引擎
    ///
    /// # 参数
    ///
    /// * `settings` - 引擎配置
    pub fn new(settings: &EngineSettings) -> Result<Self, LaunchError> {
        let robots_client = Client::builder()
            .user_agent(settings.default_user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| LaunchError::Unavailable(e.to_string()))?;

        Ok(Self::with_robots(
            settings,
            Arc::new(RobotsChecker::new(robots_client)),
        ))
    }

    /// 使用指定的robots.txt检查器创建爬取引擎
    pub fn with_robots(settings: &EngineSettings, robots: Arc<dyn RobotsCheckerTrait>) -> Self {
        Self {
            request_timeout: settings.request_timeout(),
            default_user_agent: settings.default_user_agent.clone(),
            robots,
        }
    }

    fn build_client(&self, options: &CrawlOptions, user_agent: &str) -> Result<Client, LaunchError> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(self.request_timeout)
            .cookie_store(!options.disable_cookies)
            .build()
            .map_err(|e| LaunchError::Unavailable(format!("Failed to build HTTP client: {}", e)))
    }
}

#[async_trait]
impl CrawlEngine for ReqwestEngine {
    /// 启动一次运行
    ///
    /// 校验起始URL并在后台开始爬取，立即返回
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 运行已开始，结束时发送完成信号
    /// * `Err(LaunchError)` - 规则没有可用的起始URL或HTTP客户端无法创建
    async fn launch(&self, run: CrawlRun) -> Result<(), LaunchError> {
        if run.rule.seed_urls.is_empty() {
            return Err(LaunchError::Rejected(format!(
                "rule `{}` has no seed urls",
                run.rule.name
            )));
        }

        let seeds = run
            .rule
            .seed_urls
            .iter()
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|e| LaunchError::Rejected(format!("invalid seed url `{}`: {}", raw, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let options = run.config.options();
        let user_agent = if options.user_agent.is_empty() {
            self.default_user_agent.clone()
        } else {
            options.user_agent.clone()
        };
        let client = self.build_client(options, &user_agent)?;

        let crawl = Crawl {
            task_id: run.task_id,
            client,
            robots: self.robots.clone(),
            config: run.config.clone(),
            user_agent,
        };

        tokio::spawn(async move {
            let status = match crawl.run(seeds).await {
                Ok(report) if report.seeds_fetched > 0 => {
                    info!(
                        "Task {} run finished: {} pages fetched, {} failed",
                        crawl.task_id, report.pages_fetched, report.pages_failed
                    );
                    TaskStatus::Completed
                }
                Ok(_) => {
                    warn!("Task {} run could not fetch any seed page", crawl.task_id);
                    TaskStatus::Failed
                }
                Err(e) => {
                    error!("Task {} run aborted: {}", crawl.task_id, e);
                    TaskStatus::Failed
                }
            };

            if !run.completions.send(status).await {
                debug!(
                    "Listener of task {} is gone, dropping {} signal",
                    run.task_id, status
                );
            }
        });

        Ok(())
    }

    /// 获取引擎名称
    ///
    /// # 返回值
    ///
    /// 引擎名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

/// 一次运行的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlReport {
    pub seeds_fetched: usize,
    pub pages_fetched: usize,
    pub pages_failed: usize,
}

/// 单个页面的抓取结果
enum PageOutcome {
    Fetched(Vec<Url>),
    Skipped,
    Failed,
}

/// 一次运行的上下文
struct Crawl {
    task_id: TaskId,
    client: Client,
    robots: Arc<dyn RobotsCheckerTrait>,
    config: Arc<ExecutionConfig>,
    user_agent: String,
}

impl Crawl {
    async fn run(&self, seeds: Vec<Url>) -> anyhow::Result<CrawlReport> {
        let options = self.config.options();
        let mut report = CrawlReport::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: Vec<Url> = seeds
            .into_iter()
            .filter(|url| LinkDiscoverer::is_allowed(url, options))
            .collect();
        let mut depth = 1u32;

        while !frontier.is_empty() {
            let level: Vec<Url> = frontier
                .drain(..)
                .filter(|url| options.allow_url_revisit || visited.insert(url.to_string()))
                .collect::<HashSet<_>>()
                .into_iter()
                .take(MAX_PAGES_PER_RUN.saturating_sub(report.pages_fetched + report.pages_failed))
                .collect();
            if level.is_empty() {
                break;
            }

            let outcomes: Vec<PageOutcome> = stream::iter(level)
                .map(|url| self.visit(url))
                .buffer_unordered(self.parallelism())
                .collect()
                .await;

            let follow = options.max_depth == 0 || depth < options.max_depth;
            for outcome in outcomes {
                match outcome {
                    PageOutcome::Fetched(links) => {
                        report.pages_fetched += 1;
                        if depth == 1 {
                            report.seeds_fetched += 1;
                        }
                        if follow {
                            frontier.extend(links);
                        }
                    }
                    PageOutcome::Failed => report.pages_failed += 1,
                    PageOutcome::Skipped => {}
                }
            }

            if report.pages_fetched + report.pages_failed >= MAX_PAGES_PER_RUN {
                warn!("Task {} reached the page budget of a single run", self.task_id);
                break;
            }
            depth += 1;
        }

        Ok(report)
    }

    fn parallelism(&self) -> usize {
        let limit = self.config.limit();
        if limit.enabled {
            limit.parallelism.max(1)
        } else {
            DEFAULT_PARALLELISM
        }
    }

    async fn visit(&self, url: Url) -> PageOutcome {
        let options = self.config.options();

        if !options.ignore_robots_txt {
            match self.robots.is_allowed(url.as_str(), &self.user_agent).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Task {}: {} disallowed by robots.txt", self.task_id, url);
                    return PageOutcome::Skipped;
                }
                Err(e) => warn!("Task {}: robots.txt check for {} failed: {}", self.task_id, url, e),
            }
        }

        self.throttle(&url).await;

        match self.fetch(&url).await {
            Ok(Some(body)) => {
                let links = match LinkDiscoverer::extract_links(&body, &url) {
                    Ok(links) => LinkDiscoverer::filter_links(links, options),
                    Err(e) => {
                        warn!("Task {}: failed to parse {}: {}", self.task_id, url, e);
                        Vec::new()
                    }
                };
                let output = self.config.output();
                info!(
                    "Task {} fetched {} ({} bytes) for {} sink {}",
                    self.task_id,
                    url,
                    body.len(),
                    output.output_type,
                    output.sink.name
                );
                PageOutcome::Fetched(links)
            }
            Ok(None) => PageOutcome::Failed,
            Err(e) => {
                warn!("Task {}: request to {} failed: {}", self.task_id, url, e);
                PageOutcome::Failed
            }
        }
    }

    /// 按限速规则等待，robots.txt 的 Crawl-delay 更长时以它为准
    async fn throttle(&self, url: &Url) {
        let host = url.host_str().unwrap_or_default();
        let mut wait = request_delay(self.config.limit(), host);

        if !self.config.options().ignore_robots_txt {
            if let Ok(Some(crawl_delay)) = self
                .robots
                .get_crawl_delay(url.as_str(), &self.user_agent)
                .await
            {
                wait = wait.max(crawl_delay);
            }
        }

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// 获取页面内容
    ///
    /// HTTP错误响应在规则不要求解析时返回 `None`
    async fn fetch(&self, url: &Url) -> anyhow::Result<Option<String>> {
        let options = self.config.options();
        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() && !options.parse_http_error_response {
            debug!("Task {}: {} answered {}", self.task_id, url, status);
            return Ok(None);
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if options.max_body_size > 0 && body.len() >= options.max_body_size {
                body.truncate(options.max_body_size);
                break;
            }
        }

        Ok(Some(String::from_utf8_lossy(&body).into_owned()))
    }
}

/// 计算请求前的等待时间：固定间隔加上随机抖动
fn request_delay(limit: &RateLimit, host: &str) -> Duration {
    if !limit.applies_to(host) {
        return Duration::ZERO;
    }

    let jitter_ms = limit.random_delay.as_millis() as u64;
    let jitter = if jitter_ms > 0 {
        Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    } else {
        Duration::ZERO
    };
    limit.delay + jitter
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// robots.txt 缓存有效期
const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Robots.txt检查器接口
#[async_trait]
pub trait RobotsCheckerTrait: Send + Sync {
    /// 检查URL是否被允许访问
    async fn is_allowed(&self, url_str: &str, user_agent: &str) -> Result<bool>;
    /// 获取爬取延迟
    async fn get_crawl_delay(&self, url_str: &str, user_agent: &str) -> Result<Option<Duration>>;
}

/// 缓存的Robots.txt内容
#[derive(Clone)]
struct CachedRobots {
    /// 内容
    content: String,

    /// 过期时间
    expires_at: Instant,
}

/// Robots.txt检查器
///
/// 按站点缓存robots.txt，同一进程内的所有任务共享
pub struct RobotsChecker {
    /// HTTP客户端
    client: Client,

    /// 内存缓存，键为robots.txt的URL
    cache: DashMap<String, CachedRobots>,
}

#[async_trait]
impl RobotsCheckerTrait for RobotsChecker {
    async fn is_allowed(&self, url_str: &str, user_agent: &str) -> Result<bool> {
        let url = Url::parse(url_str)?;
        let content = self.get_robots_content(&url).await?;
        let mut matcher = DefaultMatcher::default();
        Ok(matcher.one_agent_allowed_by_robots(&content, user_agent, url.as_str()))
    }

    async fn get_crawl_delay(&self, url_str: &str, user_agent: &str) -> Result<Option<Duration>> {
        let url = Url::parse(url_str)?;
        let content = self.get_robots_content(&url).await?;
        Ok(parse_crawl_delay(&content, user_agent))
    }
}

impl RobotsChecker {
    /// 创建新的Robots检查器实例
    ///
    /// # 参数
    ///
    /// * `client` - 用于获取robots.txt的HTTP客户端
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: DashMap::new(),
        }
    }

    /// 获取Robots.txt内容（带缓存）
    ///
    /// 获取失败或站点没有robots.txt时按空内容处理，即允许所有访问
    async fn get_robots_content(&self, url: &Url) -> Result<String> {
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("URL has no host: {}", url))?;
        let robots_url = match url.port() {
            Some(port) => format!("{}://{}:{}/robots.txt", url.scheme(), host, port),
            None => format!("{}://{}/robots.txt", url.scheme(), host),
        };

        if let Some(cached) = self.cache.get(&robots_url) {
            if cached.expires_at > Instant::now() {
                return Ok(cached.content.clone());
            }
        }

        let content = match self.client.get(&robots_url).send().await {
            Ok(resp) if resp.status().is_success() => resp.text().await.unwrap_or_default(),
            Ok(resp) => {
                debug!("No robots.txt at {} ({})", robots_url, resp.status());
                String::new()
            }
            Err(e) => {
                warn!("Failed to fetch robots.txt from {}: {}", robots_url, e);
                String::new()
            }
        };

        self.cache.insert(
            robots_url,
            CachedRobots {
                content: content.clone(),
                expires_at: Instant::now() + CACHE_TTL,
            },
        );

        Ok(content)
    }
}

/// 解析Crawl-delay指令
///
/// 简化实现：优先使用与User-Agent匹配的块，其次是 `*` 块
fn parse_crawl_delay(content: &str, user_agent: &str) -> Option<Duration> {
    let mut current_agent_matched = false;
    let mut delay: Option<f64> = None;
    let mut specific_agent_found = false;
    let user_agent = user_agent.to_lowercase();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_lowercase().as_str() {
            "user-agent" => {
                if value == "*" {
                    current_agent_matched = !specific_agent_found;
                } else if user_agent.contains(&value.to_lowercase()) {
                    current_agent_matched = true;
                    specific_agent_found = true;
                    delay = None;
                } else {
                    current_agent_matched = false;
                }
            }
            "crawl-delay" if current_agent_matched => {
                if let Ok(d) = value.parse::<f64>() {
                    delay = Some(d);
                }
            }
            _ => {}
        }
    }

    delay
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(Duration::from_secs_f64)
}

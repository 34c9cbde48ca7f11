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

use crate::domain::models::execution_config::CrawlOptions;
use anyhow::Result;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// 链接发现器
///
/// 负责从HTML内容中提取和过滤链接
pub struct LinkDiscoverer;

impl LinkDiscoverer {
    /// 从HTML内容中提取链接
    ///
    /// # 参数
    ///
    /// * `html_content` - HTML内容
    /// * `base_url` - 基础URL
    ///
    /// # 返回值
    ///
    /// * `Ok(HashSet<String>)` - 提取到的链接集合
    /// * `Err(anyhow::Error)` - 提取过程中出现的错误
    pub fn extract_links(html_content: &str, base_url: &Url) -> Result<HashSet<String>> {
        let fragment = Html::parse_document(html_content);
        let selector =
            Selector::parse("a[href]").map_err(|e| anyhow::anyhow!("Invalid selector: {:?}", e))?;
        let mut links = HashSet::new();

        for element in fragment.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            // Ignore fragment identifiers, mailto and javascript links
            if href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("javascript:")
            {
                continue;
            }

            if let Ok(mut url) = base_url.join(href) {
                if url.scheme() == "http" || url.scheme() == "https" {
                    url.set_fragment(None);
                    links.insert(url.to_string());
                }
            }
        }

        Ok(links)
    }

    /// 判断URL是否允许访问
    ///
    /// 域名必须在允许列表中（列表为空时不限制），并且至少匹配一条URL过滤规则
    /// （没有规则时不过滤）
    pub fn is_allowed(url: &Url, options: &CrawlOptions) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        options.is_domain_allowed(host) && options.matches_url_filters(url.as_str())
    }

    /// 过滤链接
    ///
    /// # 参数
    ///
    /// * `links` - 原始链接集合
    /// * `options` - 爬取行为选项
    ///
    /// # 返回值
    ///
    /// 过滤后的链接，按字典序排列
    pub fn filter_links(links: HashSet<String>, options: &CrawlOptions) -> Vec<Url> {
        let mut allowed: Vec<Url> = links
            .into_iter()
            .filter_map(|link| Url::parse(&link).ok())
            .filter(|url| Self::is_allowed(url, options))
            .collect();
        allowed.sort();
        allowed
    }
}

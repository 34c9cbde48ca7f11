// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

/// 安装Prometheus导出器
///
/// 导出器安装失败（例如端口被占用）只记录警告，不影响服务启动
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr = settings.listen_addr;
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    describe();
    info!("Metrics exporter listening on {}", addr);
}

fn describe() {
    metrics::describe_counter!("spiderd_tasks_created_total", "Tasks created successfully");
    metrics::describe_counter!("spiderd_task_runs_started_total", "Crawl runs started");
    metrics::describe_counter!(
        "spiderd_task_runs_total",
        "Completion signals received, by status"
    );
    metrics::describe_counter!(
        "spiderd_listener_exits_total",
        "Status listener exits, by reason"
    );
}

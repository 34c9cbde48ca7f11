// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::use_cases::task_orchestrator::OrchestrationError;

/// 接口错误
///
/// 把编排错误映射为HTTP状态码：校验错误400，未找到404，其余500
#[derive(Debug)]
pub struct AppError(pub OrchestrationError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            OrchestrationError::Validation(_) => StatusCode::BAD_REQUEST,
            OrchestrationError::NotFound(_) => StatusCode::NOT_FOUND,
            OrchestrationError::Store(_)
            | OrchestrationError::Launch(_)
            | OrchestrationError::Schedule(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed in {} phase: {}", self.0.phase(), self.0);
        }

        let body = Json(json!({
            "error": self.0.to_string(),
            "phase": self.0.phase(),
        }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<OrchestrationError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

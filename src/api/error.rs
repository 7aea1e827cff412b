//! API 错误类型与线格式映射
//!
//! 对外只有三种失败形态：
//! - 401 主密码校验失败
//! - 404 路径不存在
//! - 500 请求体不可解析或存储操作失败

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// 错误消息最大长度（字符数），超出部分截断
const MAX_ERROR_MESSAGE_CHARS: usize = 100;

/// API 错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 主密码校验失败
    #[error("Invalid password")]
    InvalidPassword,

    /// 路径或资源不存在
    #[error("Not Found")]
    NotFound,

    /// 请求体解析失败或存储操作失败
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// 由任意错误构造 Internal，消息按字符边界截断
    pub fn internal(err: impl ToString) -> Self {
        let message: String = err
            .to_string()
            .chars()
            .take(MAX_ERROR_MESSAGE_CHARS)
            .collect();
        Self::Internal(message)
    }

    /// 该错误对应的 HTTP 状态码
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPassword => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 响应体
    ///
    /// 404 是独立形状 {"error": ...}；其余为 {"success": false, "error": ...}
    fn body(&self) -> serde_json::Value {
        match self {
            Self::NotFound => json!({ "error": self.to_string() }),
            _ => json!({ "success": false, "error": self.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

/// API 层统一 Result 别名
pub type ApiResult<T> = Result<T, ApiError>;

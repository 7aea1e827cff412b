//! 请求上下文中间件：分配请求 ID 并记录访问日志

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use http::{HeaderName, HeaderValue};
use uuid::Uuid;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// 为每个请求分配 UUID，回写 x-request-id 头并记录 方法/路径/状态/耗时
pub async fn request_context(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    tracing::debug!(
        "{} {} -> {} 耗时 {:?} [{}]",
        method,
        path,
        response.status().as_u16(),
        started.elapsed(),
        request_id
    );

    response
}

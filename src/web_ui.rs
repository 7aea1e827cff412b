//! 内嵌静态页面服务
//!
//! 静态资源在编译期嵌入二进制，按资源名查找，
//! 嵌入表之外的路径（包括任何形式的目录穿越）一律 404

use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::{Method, StatusCode, Uri, header};
use rust_embed::RustEmbed;

use crate::api::error::ApiError;

#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

/// 路由兜底 handler：OPTIONS 放行、静态资源、JSON 404
///
/// GET/HEAD 按路径提供嵌入资源，`/` 映射到 index.html；
/// OPTIONS 统一返回 200 空响应（CORS 头由路由层附加）
pub async fn static_handler(method: Method, uri: Uri) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    if method != Method::GET && method != Method::HEAD {
        return ApiError::NotFound.into_response();
    }

    let raw_path = uri.path().trim_start_matches('/');
    let decoded = urlencoding::decode(raw_path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw_path.to_string());
    let path = if decoded.is_empty() {
        "index.html".to_string()
    } else {
        decoded
    };

    match StaticAssets::get(&path) {
        Some(asset) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref())],
                Bytes::from(asset.data.into_owned()),
            )
                .into_response()
        }
        None => ApiError::NotFound.into_response(),
    }
}

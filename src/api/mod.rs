//! HTTP API 层：路由组装、CORS 策略与错误映射

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use http::{Method, header};
use tower_http::cors::{Any, CorsLayer};

pub use state::AppState;

use crate::web_ui;

/// 全站统一的 CORS 策略：任意来源，GET/POST/OPTIONS
///
/// 作为最外层中间件，401/404 等错误响应同样携带 CORS 头
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// 组装完整路由
///
/// 方法不匹配与未注册路径一律交给静态兜底 handler
/// （OPTIONS 放行、静态资源、JSON 404）
pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/config", get(handlers::get_config))
        .route("/api/save-keys", post(handlers::save_keys))
        .route("/api/fetch-keys", post(handlers::fetch_keys))
        .route("/api/delete-key", post(handlers::delete_key))
        .route("/api/clear-all-keys", post(handlers::clear_all_keys))
        .route(
            "/api/auto-claim-schedule",
            post(handlers::auto_claim_schedule),
        )
        .route("/api/chat", post(handlers::chat))
        .method_not_allowed_fallback(web_ui::static_handler)
        .fallback(web_ui::static_handler)
        .layer(from_fn(middleware::request_context))
        .layer(cors_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybox::auth::Sha256Authenticator;
    use crate::keybox::storage::FileKeyStorage;
    use crate::keybox::store::KeyStore;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_create_api_router() {
        let file = NamedTempFile::new().unwrap();
        let store = Arc::new(KeyStore::new(Arc::new(FileKeyStorage::new(file.path()))));
        let state = Arc::new(AppState::new(
            String::new(),
            store,
            Arc::new(Sha256Authenticator::new("pw")),
        ));

        // 路由组装不应 panic（重复路径、非法模式会在这里暴露）
        let _router = create_api_router(state);
    }
}

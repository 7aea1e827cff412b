//! 共享应用状态

use std::sync::Arc;

use crate::keybox::auth::Authenticator;
use crate::keybox::store::KeyStore;

/// 注入各 handler 的共享状态
///
/// 密钥库与校验器都以注入方式持有，不依赖任何全局单例
pub struct AppState {
    /// 下发给前端的 Gemini API Key
    pub gemini_api_key: String,
    /// 密钥库
    pub store: Arc<KeyStore>,
    /// 主密码校验器
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(
        gemini_api_key: String,
        store: Arc<KeyStore>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            gemini_api_key,
            store,
            authenticator,
        }
    }
}

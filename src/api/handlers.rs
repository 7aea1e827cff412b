//! API 端点 handler 与请求/响应类型
//!
//! 请求体统一以原始字节读入后手动解析，解析失败映射为 500
//! （而非框架默认的 400），与既有客户端的约定保持一致

use std::sync::Arc;

use axum::{Json, extract::State};
use bytes::Bytes;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::keybox::model::record::{KeyCandidate, SecretRecord};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// GET /api/config 响应
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    #[serde(rename = "GEMINI_API_KEY")]
    pub gemini_api_key: String,
}

/// POST /api/save-keys 请求体
///
/// 顶层 source/device/status 为批次级标签，适用于未自带标签的候选
#[derive(Debug, Default, Deserialize)]
pub struct SaveKeysRequest {
    #[serde(default)]
    pub keys: Vec<KeyCandidate>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl SaveKeysRequest {
    /// 把批次级标签合并进各候选，候选自带的标签优先
    fn into_candidates(self) -> Vec<KeyCandidate> {
        let Self {
            keys,
            source,
            device,
            status,
        } = self;

        keys.into_iter()
            .map(|mut candidate| {
                candidate.source = candidate.source.or_else(|| source.clone());
                candidate.device = candidate.device.or_else(|| device.clone());
                candidate.status = candidate.status.or_else(|| status.clone());
                candidate
            })
            .collect()
    }
}

/// POST /api/save-keys 响应
#[derive(Debug, Serialize)]
pub struct SaveKeysResponse {
    pub success: bool,
    pub saved: usize,
    pub total_received: usize,
    pub note: &'static str,
}

/// POST /api/fetch-keys 请求体
#[derive(Debug, Default, Deserialize)]
pub struct FetchKeysRequest {
    #[serde(default)]
    pub password: String,
}

/// POST /api/fetch-keys 响应
#[derive(Debug, Serialize)]
pub struct FetchKeysResponse {
    pub success: bool,
    pub keys: Vec<SecretRecord>,
}

/// POST /api/delete-key 请求体
#[derive(Debug, Default, Deserialize)]
pub struct DeleteKeyRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/clear-all-keys 请求体
#[derive(Debug, Default, Deserialize)]
pub struct ClearAllKeysRequest {
    #[serde(default)]
    pub password: String,
}

/// delete-key / clear-all-keys 共用响应
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: usize,
}

/// 占位端点响应
#[derive(Debug, Serialize)]
pub struct PlaceholderResponse {
    pub success: bool,
    pub message: &'static str,
}

/// 手动解析请求体，格式错误映射为 500
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(ApiError::internal)
}

/// 主密码校验，不通过返回 401
fn authorize(state: &AppState, password: &str) -> ApiResult<()> {
    if state.authenticator.verify(password) {
        Ok(())
    } else {
        tracing::warn!("主密码校验失败");
        Err(ApiError::InvalidPassword)
    }
}

/// GET /api/config
///
/// 返回前端所需的 Gemini API Key，无需密码
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        gemini_api_key: state.gemini_api_key.clone(),
    })
}

/// POST /api/save-keys
///
/// 批量保存候选密钥。写入开放不设密码，读取与删除才受控
pub async fn save_keys(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<SaveKeysResponse>> {
    let request: SaveKeysRequest = parse_body(&body)?;

    let outcome = state
        .store
        .add_many(request.into_candidates())
        .await
        .map_err(ApiError::internal)?;

    let note = match state.store.storage_type() {
        "postgresql" => "Keys saved to PostgreSQL storage.",
        _ => "Keys saved to local JSON file (May be temporary).",
    };

    Ok(Json(SaveKeysResponse {
        success: true,
        saved: outcome.saved,
        total_received: outcome.total_received,
        note,
    }))
}

/// POST /api/fetch-keys
///
/// 按入库时间倒序返回全部密钥，需要主密码
pub async fn fetch_keys(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<FetchKeysResponse>> {
    let request: FetchKeysRequest = parse_body(&body)?;
    authorize(&state, &request.password)?;

    let keys = state.store.list_ordered().await;
    Ok(Json(FetchKeysResponse {
        success: true,
        keys,
    }))
}

/// POST /api/delete-key
///
/// 删除指定 key，需要主密码；key 不存在时 deleted 为 0
pub async fn delete_key(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<DeleteResponse>> {
    let request: DeleteKeyRequest = parse_body(&body)?;
    authorize(&state, &request.password)?;

    let deleted = state
        .store
        .delete_one(&request.key)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

/// POST /api/clear-all-keys
///
/// 清空密钥库，需要主密码；deleted 为清空前的条数
pub async fn clear_all_keys(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<DeleteResponse>> {
    let request: ClearAllKeysRequest = parse_body(&body)?;
    authorize(&state, &request.password)?;

    let deleted = state.store.clear_all().await.map_err(ApiError::internal)?;

    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

/// POST /api/auto-claim-schedule
///
/// 占位端点：仅校验请求体为合法 JSON，返回固定应答
pub async fn auto_claim_schedule(body: Bytes) -> ApiResult<Json<PlaceholderResponse>> {
    let _payload: serde_json::Value = parse_body(&body)?;

    Ok(Json(PlaceholderResponse {
        success: true,
        message: "Schedule endpoint placeholder.",
    }))
}

/// POST /api/chat
///
/// 占位端点：仅校验请求体为合法 JSON，返回固定应答
pub async fn chat(body: Bytes) -> ApiResult<Json<PlaceholderResponse>> {
    let _payload: serde_json::Value = parse_body(&body)?;

    Ok(Json(PlaceholderResponse {
        success: true,
        message: "Chat endpoint placeholder.",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybox::auth::Sha256Authenticator;
    use crate::keybox::storage::FileKeyStorage;
    use crate::keybox::store::KeyStore;
    use http::StatusCode;
    use tempfile::NamedTempFile;

    const TEST_PASSWORD: &str = "test-password";

    // NamedTempFile 随句柄删除，必须随 state 一起持有
    fn test_state() -> (Arc<AppState>, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let store = Arc::new(KeyStore::new(Arc::new(FileKeyStorage::new(file.path()))));
        let state = Arc::new(AppState::new(
            "gemini-test-key".to_string(),
            store,
            Arc::new(Sha256Authenticator::new(TEST_PASSWORD)),
        ));
        (state, file)
    }

    fn body(raw: &str) -> Bytes {
        Bytes::copy_from_slice(raw.as_bytes())
    }

    fn password_body() -> Bytes {
        body(&format!(r#"{{"password": "{}"}}"#, TEST_PASSWORD))
    }

    #[tokio::test]
    async fn test_get_config_returns_key() {
        let (state, _file) = test_state();

        let response = get_config(State(state)).await;
        assert_eq!(response.0.gemini_api_key, "gemini-test-key");
    }

    #[tokio::test]
    async fn test_save_keys_reports_counts() {
        let (state, _file) = test_state();

        let response = save_keys(
            State(state.clone()),
            body(r#"{"keys": [{"key": "sk-a"}, {"key": "sk-b"}, {"key": ""}]}"#),
        )
        .await
        .unwrap();

        assert!(response.0.success);
        assert_eq!(response.0.saved, 2);
        assert_eq!(response.0.total_received, 3);
        assert_eq!(
            response.0.note,
            "Keys saved to local JSON file (May be temporary)."
        );

        // 重复提交不再计数
        let response = save_keys(State(state), body(r#"{"keys": [{"key": "sk-a"}]}"#))
            .await
            .unwrap();
        assert_eq!(response.0.saved, 0);
        assert_eq!(response.0.total_received, 1);
    }

    #[tokio::test]
    async fn test_save_keys_malformed_body_is_500() {
        let (state, _file) = test_state();

        let err = save_keys(State(state), body("{ not json")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_batch_tags_apply_to_untagged_candidates() {
        let (state, _file) = test_state();

        save_keys(
            State(state.clone()),
            body(
                r#"{
                    "keys": [
                        {"key": "sk-tagged", "source": "own-source"},
                        {"key": "sk-plain"}
                    ],
                    "source": "batch-source",
                    "device": "batch-device"
                }"#,
            ),
        )
        .await
        .unwrap();

        let response = fetch_keys(State(state), password_body()).await.unwrap();
        let keys = response.0.keys;

        let tagged = keys.iter().find(|r| r.key == "sk-tagged").unwrap();
        assert_eq!(tagged.source, "own-source");
        assert_eq!(tagged.device, "batch-device");

        let plain = keys.iter().find(|r| r.key == "sk-plain").unwrap();
        assert_eq!(plain.source, "batch-source");
        assert_eq!(plain.device, "batch-device");
        assert_eq!(plain.status, "success");
    }

    #[tokio::test]
    async fn test_fetch_keys_requires_password() {
        let (state, _file) = test_state();

        save_keys(State(state.clone()), body(r#"{"keys": [{"key": "sk-a"}]}"#))
            .await
            .unwrap();

        let err = fetch_keys(State(state.clone()), body(r#"{"password": "wrong"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPassword));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        // 缺少 password 字段同样拒绝
        let err = fetch_keys(State(state.clone()), body("{}")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidPassword));

        let response = fetch_keys(State(state), password_body()).await.unwrap();
        assert_eq!(response.0.keys.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_key_requires_password_and_preserves_store() {
        let (state, _file) = test_state();

        save_keys(State(state.clone()), body(r#"{"keys": [{"key": "sk-a"}]}"#))
            .await
            .unwrap();

        let err = delete_key(
            State(state.clone()),
            body(r#"{"key": "sk-a", "password": "wrong"}"#),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPassword));

        // 拒绝后存储内容不变
        let response = fetch_keys(State(state), password_body()).await.unwrap();
        assert_eq!(response.0.keys.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_key_reports_hits() {
        let (state, _file) = test_state();

        save_keys(State(state.clone()), body(r#"{"keys": [{"key": "sk-a"}]}"#))
            .await
            .unwrap();

        let response = delete_key(
            State(state.clone()),
            body(&format!(
                r#"{{"key": "sk-a", "password": "{}"}}"#,
                TEST_PASSWORD
            )),
        )
        .await
        .unwrap();
        assert_eq!(response.0.deleted, 1);

        // 再删同一 key：未命中
        let response = delete_key(
            State(state),
            body(&format!(
                r#"{{"key": "sk-a", "password": "{}"}}"#,
                TEST_PASSWORD
            )),
        )
        .await
        .unwrap();
        assert_eq!(response.0.deleted, 0);
    }

    #[tokio::test]
    async fn test_clear_all_keys_flow() {
        let (state, _file) = test_state();

        save_keys(
            State(state.clone()),
            body(r#"{"keys": [{"key": "sk-a"}, {"key": "sk-b"}]}"#),
        )
        .await
        .unwrap();

        let err = clear_all_keys(State(state.clone()), body(r#"{"password": "wrong"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPassword));

        let response = clear_all_keys(State(state.clone()), password_body())
            .await
            .unwrap();
        assert_eq!(response.0.deleted, 2);

        let response = fetch_keys(State(state), password_body()).await.unwrap();
        assert!(response.0.keys.is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_endpoints() {
        let response = auto_claim_schedule(body(r#"{"anything": 1}"#)).await.unwrap();
        assert_eq!(response.0.message, "Schedule endpoint placeholder.");

        let response = chat(body(r#"{"message": "hi"}"#)).await.unwrap();
        assert_eq!(response.0.message, "Chat endpoint placeholder.");

        // 占位端点同样校验 JSON
        let err = chat(body("nope")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_config_response_wire_format() {
        let response = ConfigResponse {
            gemini_api_key: "abc".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"GEMINI_API_KEY":"abc"}"#
        );
    }
}

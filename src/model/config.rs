//! 服务配置
//!
//! JSON 配置文件（camelCase 键），部分字段可被环境变量覆盖

use serde::{Deserialize, Serialize};

/// 默认主密码的 SHA-256 摘要，生产部署应通过 masterPasswordSha256 覆盖
pub const DEFAULT_MASTER_PASSWORD_SHA256: &str =
    "e3b08e16b8dd68000dd2da6797a56ee54ea2120082bf7bc2bac66e374f9c874c";

/// 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// 监听地址
    pub host: String,
    /// 监听端口（可被环境变量 PORT 覆盖）
    pub port: u16,
    /// 下发给前端的 Gemini API Key（可被环境变量 GEMINI_API_KEY 覆盖）
    pub gemini_api_key: String,
    /// 主密码的 SHA-256 摘要（64 位十六进制）
    pub master_password_sha256: String,
    /// 密钥文件路径（文件存储后端）
    pub keys_file: String,
    /// 存储后端类型："file" 或 "postgres"
    pub key_storage_type: String,
    /// PostgreSQL 连接配置（key_storage_type 为 postgres 时必填）
    pub postgres: Option<PostgresConfig>,
}

/// PostgreSQL 连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostgresConfig {
    /// 数据库连接 URL
    pub database_url: String,
    /// 密钥表名
    pub table_name: String,
    /// 连接池最大连接数
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            gemini_api_key: String::new(),
            master_password_sha256: DEFAULT_MASTER_PASSWORD_SHA256.to_string(),
            keys_file: "secret_keys.json".to_string(),
            key_storage_type: "file".to_string(),
            postgres: None,
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            table_name: "secret_keys".to_string(),
            max_connections: 5,
        }
    }
}

impl Config {
    /// 默认配置文件路径
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// 加载配置文件并应用环境变量覆盖
    ///
    /// 文件不存在时使用默认配置；文件存在但无法解析时返回错误
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut config = if std::path::Path::new(path).exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("读取配置文件失败: {}", e))?;
            serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("解析配置文件失败: {}", e))?
        } else {
            tracing::info!("配置文件 {} 不存在，使用默认配置", path);
            Self::default()
        };

        config.apply_env_overrides(
            std::env::var("PORT").ok(),
            std::env::var("GEMINI_API_KEY").ok(),
        );

        Ok(config)
    }

    /// 应用环境变量覆盖
    ///
    /// PORT 仅在能解析为端口号时生效；GEMINI_API_KEY 仅在长度超过 30
    /// 时生效，过短的值视为脚本占位符并忽略
    pub fn apply_env_overrides(&mut self, port: Option<String>, gemini_api_key: Option<String>) {
        if let Some(raw) = port {
            match raw.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("环境变量 PORT 无法解析为端口号，已忽略: {}", raw),
            }
        }

        if let Some(key) = gemini_api_key {
            if key.len() > 30 {
                self.gemini_api_key = key;
            } else if !key.is_empty() {
                tracing::warn!("环境变量 GEMINI_API_KEY 过短，已忽略");
            }
        }
    }
}

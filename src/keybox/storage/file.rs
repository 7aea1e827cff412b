//! 文件密钥存储实现
//!
//! 兼容既有的 secret_keys.json 文件格式：以 key 为键的单个 JSON 对象

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::keybox::model::record::SecretRecord;

use super::traits::KeyStorage;

/// 文件密钥存储
///
/// 读写均为整个文件，JSON 序列化为 pretty 格式便于人工检查
pub struct FileKeyStorage {
    /// 密钥文件路径
    path: PathBuf,
}

impl FileKeyStorage {
    /// 创建文件存储实例
    ///
    /// # Arguments
    /// * `path` - 密钥文件路径
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 获取文件路径
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl KeyStorage for FileKeyStorage {
    async fn load_all(&self) -> anyhow::Result<BTreeMap<String, SecretRecord>> {
        // 使用 spawn_blocking 避免阻塞异步运行时
        let path = self.path.clone();
        let records = tokio::task::spawn_blocking(move || {
            if !path.exists() {
                // 文件尚未创建，等价于空存储
                return Ok(BTreeMap::new());
            }
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("读取密钥文件失败: {}", e))?;
            let records: BTreeMap<String, SecretRecord> = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("解析密钥文件失败: {}", e))?;
            Ok::<_, anyhow::Error>(records)
        })
        .await??;

        Ok(records)
    }

    async fn save_all(&self, records: &BTreeMap<String, SecretRecord>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || std::fs::write(&path, json))
            .await?
            .map_err(|e| anyhow::anyhow!("写入密钥文件失败: {}", e))?;

        tracing::debug!("已回写密钥到文件: {:?}", self.path);
        Ok(())
    }

    async fn ensure_initialized(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            return Ok(());
        }

        self.save_all(&BTreeMap::new()).await?;
        tracing::info!("已创建空密钥文件: {:?}", self.path);
        Ok(())
    }

    fn storage_type(&self) -> &'static str {
        "file"
    }
}

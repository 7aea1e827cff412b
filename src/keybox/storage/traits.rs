//! 密钥存储 trait 定义

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::keybox::model::record::SecretRecord;

/// 密钥存储后端抽象
///
/// 支持多种存储实现：文件、PostgreSQL 等。
/// 语义统一为整体读写：每次操作加载或回写完整集合
#[async_trait]
pub trait KeyStorage: Send + Sync {
    /// 加载全部密钥记录
    ///
    /// 后端不存在（文件缺失）时返回空集合；
    /// 后端存在但不可读/不可解析时返回错误，由上层决定降级策略
    async fn load_all(&self) -> anyhow::Result<BTreeMap<String, SecretRecord>>;

    /// 整体回写全部密钥记录
    ///
    /// 替换所有现有记录
    async fn save_all(&self, records: &BTreeMap<String, SecretRecord>) -> anyhow::Result<()>;

    /// 初始化空的后端存储（启动时调用）
    ///
    /// 默认实现不做任何事；文件后端创建空文件，PostgreSQL 后端建表
    async fn ensure_initialized(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// 获取存储类型名称（用于日志）
    fn storage_type(&self) -> &'static str;
}

//! 密钥库：在存储后端之上实现增删查语义
//!
//! 每次操作都是 加载-修改-回写 完整集合；写操作持互斥锁串行执行，
//! 避免并发的读改写互相覆盖

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::keybox::model::record::{KeyCandidate, SecretRecord, now_added};
use crate::keybox::storage::KeyStorage;

/// 一次批量保存的结果
#[derive(Debug, Clone, Copy)]
pub struct SaveOutcome {
    /// 实际新增的记录数
    pub saved: usize,
    /// 提交的候选总数（含空 key 与重复 key）
    pub total_received: usize,
}

/// 密钥库
///
/// 读策略宽松：存储读取失败记日志并按空集合处理，服务照常响应；
/// 写策略严格：回写失败向调用方返回错误
pub struct KeyStore {
    storage: Arc<dyn KeyStorage>,
    /// 串行化写操作的互斥锁，临界区覆盖整个 加载-修改-回写 序列
    write_lock: Mutex<()>,
}

impl KeyStore {
    pub fn new(storage: Arc<dyn KeyStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// 加载全部记录，读取失败降级为空集合
    pub async fn load(&self) -> BTreeMap<String, SecretRecord> {
        match self.storage.load_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("加载密钥存储失败，按空集合处理: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// 批量新增候选密钥
    ///
    /// 空 key 跳过；已存在的 key 跳过（首次写入胜出，标签不更新）；
    /// 遍历完成后整体回写一次。回写失败时本批次视为未保存
    pub async fn add_many(&self, candidates: Vec<KeyCandidate>) -> anyhow::Result<SaveOutcome> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await;
        let total_received = candidates.len();
        let mut saved = 0;

        for candidate in candidates {
            if candidate.key.is_empty() {
                continue;
            }
            if records.contains_key(&candidate.key) {
                continue;
            }
            let record = candidate.into_record(now_added());
            records.insert(record.key.clone(), record);
            saved += 1;
        }

        self.storage.save_all(&records).await?;

        tracing::info!("已保存 {}/{} 个新密钥", saved, total_received);
        Ok(SaveOutcome {
            saved,
            total_received,
        })
    }

    /// 删除指定 key 的记录，返回删除条数（0 或 1）
    ///
    /// 无论是否命中都回写一次，保持与整体读写语义一致
    pub async fn delete_one(&self, key: &str) -> anyhow::Result<usize> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await;
        let deleted = usize::from(records.remove(key).is_some());

        self.storage.save_all(&records).await?;

        tracing::info!("删除密钥: 命中 {} 条", deleted);
        Ok(deleted)
    }

    /// 清空全部记录，返回清空前的条数
    pub async fn clear_all(&self) -> anyhow::Result<usize> {
        let _guard = self.write_lock.lock().await;

        let records = self.load().await;
        let deleted = records.len();

        self.storage.save_all(&BTreeMap::new()).await?;

        tracing::info!("已清空密钥库，共删除 {} 条", deleted);
        Ok(deleted)
    }

    /// 按入库时间倒序返回全部记录（最新在前）
    ///
    /// 时间戳为零填充格式，字典序即时间序；
    /// 同一秒入库的记录按 key 升序并列（稳定排序保持 BTreeMap 迭代序）
    pub async fn list_ordered(&self) -> Vec<SecretRecord> {
        let records = self.load().await;
        let mut list: Vec<SecretRecord> = records.into_values().collect();
        list.sort_by(|a, b| b.added.cmp(&a.added));
        list
    }

    /// 底层存储类型（用于日志与响应提示语）
    pub fn storage_type(&self) -> &'static str {
        self.storage.storage_type()
    }
}

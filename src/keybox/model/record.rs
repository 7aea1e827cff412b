//! 密钥记录数据模型

use chrono::Utc;
use serde::{Deserialize, Serialize};

fn default_source() -> String {
    "unknown".to_string()
}

fn default_device() -> String {
    "unknown".to_string()
}

fn default_status() -> String {
    "success".to_string()
}

/// 单条已存储的密钥记录
///
/// `key` 即密钥本身，同时作为唯一标识；`added` 在首次入库时分配，
/// 此后不再变化。磁盘格式为以 key 为键的 JSON 对象，记录字段原样序列化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretRecord {
    /// 密钥内容（主键）
    pub key: String,
    /// 入库时间，UTC，格式 YYYY-MM-DD HH:MM:SS
    pub added: String,
    /// 来源标签
    #[serde(default = "default_source")]
    pub source: String,
    /// 设备标签
    #[serde(default = "default_device")]
    pub device: String,
    /// 状态标签
    #[serde(default = "default_status")]
    pub status: String,
}

/// 一次提交中的单个候选密钥
///
/// `key` 为空视为无效候选；标签字段缺省时由批次级标签或默认值补齐
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyCandidate {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl KeyCandidate {
    /// 按候选标签生成入库记录，缺省字段取默认值
    pub fn into_record(self, added: String) -> SecretRecord {
        SecretRecord {
            key: self.key,
            added,
            source: self.source.unwrap_or_else(default_source),
            device: self.device.unwrap_or_else(default_device),
            status: self.status.unwrap_or_else(default_status),
        }
    }
}

/// 当前 UTC 时间的入库时间戳
pub fn now_added() -> String {
    format_added(Utc::now())
}

/// 格式化入库时间戳（零填充，字典序即时间序）
pub fn format_added(time: chrono::DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_added_zero_padded() {
        let time = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_added(time), "2026-01-02 03:04:05");
    }

    #[test]
    fn test_candidate_into_record_defaults() {
        let candidate = KeyCandidate {
            key: "sk-test".to_string(),
            ..Default::default()
        };

        let record = candidate.into_record("2026-01-01 00:00:00".to_string());
        assert_eq!(record.key, "sk-test");
        assert_eq!(record.source, "unknown");
        assert_eq!(record.device, "unknown");
        assert_eq!(record.status, "success");
    }

    #[test]
    fn test_candidate_tags_win_over_defaults() {
        let candidate = KeyCandidate {
            key: "sk-test".to_string(),
            source: Some("browser".to_string()),
            device: None,
            status: Some("pending".to_string()),
        };

        let record = candidate.into_record("2026-01-01 00:00:00".to_string());
        assert_eq!(record.source, "browser");
        assert_eq!(record.device, "unknown");
        assert_eq!(record.status, "pending");
    }

    #[test]
    fn test_record_deserialize_fills_missing_tags() {
        // 手工编辑过的存储文件可能缺少标签字段
        let record: SecretRecord =
            serde_json::from_str(r#"{"key": "k1", "added": "2026-01-01 00:00:00"}"#).unwrap();
        assert_eq!(record.source, "unknown");
        assert_eq!(record.device, "unknown");
        assert_eq!(record.status, "success");
    }
}

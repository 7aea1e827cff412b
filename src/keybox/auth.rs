//! 主密码校验
//!
//! 配置文件只保存 SHA-256 摘要，进程内不持有明文密码

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// 密码校验器抽象
///
/// fetch / delete / clear 三类操作在调用存储前先经过校验
pub trait Authenticator: Send + Sync {
    /// 校验候选密码，命中返回 true
    fn verify(&self, candidate: &str) -> bool;
}

/// 基于 SHA-256 摘要的密码校验器
///
/// 摘要比较使用常量时间实现，避免逐字节短路泄露前缀信息
pub struct Sha256Authenticator {
    digest: [u8; 32],
}

impl Sha256Authenticator {
    /// 从明文密码构造（仅用于测试或交互式配置）
    pub fn new(password: &str) -> Self {
        let digest = Sha256::digest(password.as_bytes());
        Self {
            digest: digest.into(),
        }
    }

    /// 从 64 位十六进制摘要构造
    pub fn from_digest_hex(digest_hex: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(digest_hex.trim())
            .map_err(|e| anyhow::anyhow!("主密码摘要不是有效的十六进制: {}", e))?;
        let digest: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| anyhow::anyhow!("主密码摘要长度应为 64 个十六进制字符"))?;
        Ok(Self { digest })
    }

    /// 当前摘要的十六进制表示（用于日志核对）
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

impl Authenticator for Sha256Authenticator {
    fn verify(&self, candidate: &str) -> bool {
        let computed = Sha256::digest(candidate.as_bytes());
        computed.as_slice().ct_eq(self.digest.as_slice()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_correct_password() {
        let auth = Sha256Authenticator::new("open-sesame");
        assert!(auth.verify("open-sesame"));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let auth = Sha256Authenticator::new("open-sesame");
        assert!(!auth.verify("open-sesam"));
        assert!(!auth.verify(""));
        assert!(!auth.verify("OPEN-SESAME"));
    }

    #[test]
    fn test_from_digest_hex_round_trip() {
        let auth = Sha256Authenticator::new("963050");
        let rebuilt = Sha256Authenticator::from_digest_hex(&auth.digest_hex()).unwrap();
        assert!(rebuilt.verify("963050"));
        assert!(!rebuilt.verify("963051"));
    }

    #[test]
    fn test_from_digest_hex_rejects_garbage() {
        assert!(Sha256Authenticator::from_digest_hex("not-hex").is_err());
        // 长度不足 32 字节
        assert!(Sha256Authenticator::from_digest_hex("deadbeef").is_err());
    }
}

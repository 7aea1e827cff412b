//! 密钥存储抽象层
//!
//! 支持多种存储后端：
//! - 文件存储（默认，兼容既有 JSON 文件）
//! - PostgreSQL 存储（可选）
//!
//! # 使用方式
//!
//! ```rust
//! // 文件存储
//! let storage = FileKeyStorage::new("secret_keys.json");
//!
//! // PostgreSQL 存储（需要启用 postgres feature）
//! #[cfg(feature = "postgres")]
//! let storage = PostgresKeyStorage::new("postgres://...", "secret_keys", 5).await?;
//! ```

mod traits;
mod file;

#[cfg(feature = "postgres")]
mod postgres;

pub use traits::KeyStorage;
pub use file::FileKeyStorage;

#[cfg(feature = "postgres")]
pub use postgres::PostgresKeyStorage;

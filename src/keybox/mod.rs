//! 密钥库领域层：数据模型、存储后端、库操作与主密码校验

pub mod auth;
pub mod model;
pub mod storage;
pub mod store;

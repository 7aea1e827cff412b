//! 领域数据模型

pub mod record;

//! 聊天室系统核心领域模型
//!
//! 包含参与者、消息两个核心实体，以及文本净化和相关的业务规则。

pub mod errors;
pub mod message;
pub mod participant;
pub mod sanitize;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use message::*;
pub use participant::*;
pub use sanitize::sanitize;
pub use value_objects::*;

//! 领域模型错误定义
//!
//! 定义了系统中所有可能的错误类型，提供清晰的错误上下文。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 请求字段校验失败，携带全部违反项
    #[error("validation failed: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    /// 参与者名称已被占用
    #[error("participant name already taken: {name}")]
    DuplicateName { name: String },

    /// 发送者不在当前参与者列表中
    #[error("sender is not an active participant: {name}")]
    UnknownSender { name: String },

    /// 参与者不存在
    #[error("participant not found: {name}")]
    ParticipantNotFound { name: String },

    /// 消息不存在
    #[error("message not found")]
    MessageNotFound,

    /// 调用者不是消息作者
    #[error("caller is not the message author")]
    Forbidden,

    /// limit 参数不是正整数
    #[error("limit must be a positive integer: {value}")]
    InvalidLimit { value: String },
}

impl DomainError {
    /// 创建校验错误
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation { errors }
    }

    /// 创建单条校验错误
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![message.into()],
        }
    }

    /// 创建重名错误
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// 创建未知发送者错误
    pub fn unknown_sender(name: impl Into<String>) -> Self {
        Self::UnknownSender { name: name.into() }
    }

    /// 创建参与者不存在错误
    pub fn participant_not_found(name: impl Into<String>) -> Self {
        Self::ParticipantNotFound { name: name.into() }
    }

    /// 创建非法 limit 错误
    pub fn invalid_limit(value: impl Into<String>) -> Self {
        Self::InvalidLimit {
            value: value.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;

/// 存储层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// 目标记录不存在
    #[error("record not found")]
    NotFound,

    /// 唯一约束冲突
    #[error("record already exists")]
    Conflict,

    /// 底层存储失败，原因不透明转发
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

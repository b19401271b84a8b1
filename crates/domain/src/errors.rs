//! 领域模型错误定义
//!
//! 系统的统一错误分类。仓储层把存储错误映射到这里，服务层原样向上
//! 传播，HTTP 层再翻译成状态码。存储细节不允许泄漏给客户端。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 资源不存在：零行读取，或更新/删除影响零行
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// 资源已存在：唯一约束冲突，或登录路径上已带有效 cookie
    #[error("{entity} already exists")]
    AlreadyExists { entity: &'static str },

    /// 更新映射中出现白名单之外的键
    #[error("invalid fields: {fields:?}")]
    InvalidFields { fields: Vec<String> },

    /// 结构合法但语义被拒绝的值
    #[error("invalid value: {message}")]
    InvalidValues { message: String },

    /// 验证码不匹配
    #[error("invalid verification code")]
    InvalidCode,

    /// 验证码尝试次数耗尽
    #[error("no verification attempts left")]
    ZeroAttempts,

    /// 验证码已过期
    #[error("verification code expired")]
    CodeExpired,

    /// 未认证
    #[error("unauthorized")]
    Unauthorized,

    /// 无权限
    #[error("forbidden")]
    Forbidden,

    /// 请求超时
    #[error("operation timed out")]
    Timeout,

    /// 触发限流
    #[error("too many requests")]
    TooManyRequests,

    /// 其他存储/内部错误，带操作标签；message 只进日志
    #[error("storage error in {op}: {message}")]
    Storage { op: &'static str, message: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn already_exists(entity: &'static str) -> Self {
        Self::AlreadyExists { entity }
    }

    pub fn invalid_fields(fields: Vec<String>) -> Self {
        Self::InvalidFields { fields }
    }

    pub fn invalid_values(message: impl Into<String>) -> Self {
        Self::InvalidValues {
            message: message.into(),
        }
    }

    pub fn storage(op: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            op,
            message: message.into(),
        }
    }

    /// 是否属于验证流程的子状态（HTTP 层对它们回 200 + 类型化负载）
    pub fn is_verification_flow(&self) -> bool {
        matches!(
            self,
            Self::InvalidCode | Self::ZeroAttempts | Self::CodeExpired
        )
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;

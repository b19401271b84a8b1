//! 邮件发送端口

use async_trait::async_trait;
use domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("mail build error: {0}")]
    Build(String),
    #[error("mail transport error: {0}")]
    Transport(String),
}

impl From<MailerError> for DomainError {
    fn from(err: MailerError) -> Self {
        DomainError::storage("mail.send", err.to_string())
    }
}

/// 验证码邮件发送器
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_code(
        &self,
        to: &str,
        nickname: &str,
        code: &str,
    ) -> Result<(), MailerError>;
}

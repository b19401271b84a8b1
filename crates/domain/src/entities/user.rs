//! 用户实体定义
//!
//! 用户只能经由验证通过的注册流程产生。

use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// 用户唯一ID
    pub id: Uuid,
    /// 昵称（唯一）
    pub nickname: String,
    /// 登录名（唯一）
    pub login: String,
    /// 邮箱（唯一）
    pub email: String,
    /// 密码哈希（敏感信息，不在序列化中包含）
    #[serde(skip_serializing, default)]
    pub password: String,
    /// 头像URL，注册时为空串
    pub avatar: String,
    /// 注册时间
    pub registered_at: DateTime<Utc>,
    /// 拥有的 readme 数量
    pub num_of_readmes: i64,
    /// 拥有的模板数量
    pub num_of_templates: i64,
    /// 收藏的模板
    pub favorite_templates: Vec<Uuid>,
    /// 收藏的挂件
    pub favorite_widgets: Vec<Uuid>,
}

impl User {
    /// 从验证通过的凭据创建新用户：全新 id、零计数、空头像
    pub fn from_verified(
        nickname: impl Into<String>,
        login: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            nickname: nickname.into(),
            login: login.into(),
            email: email.into(),
            password: password_hash.into(),
            avatar: String::new(),
            registered_at: now,
            num_of_readmes: 0,
            num_of_templates: 0,
            favorite_templates: Vec::new(),
            favorite_widgets: Vec::new(),
        }
    }

    /// 校验昵称：3-32 个字符
    pub fn validate_nickname(nickname: &str) -> DomainResult<()> {
        let len = nickname.chars().count();
        if !(3..=32).contains(&len) {
            return Err(DomainError::invalid_values(
                "nickname must be 3-32 characters",
            ));
        }
        Ok(())
    }

    /// 校验登录名：3-32 个字符，仅字母数字下划线
    pub fn validate_login(login: &str) -> DomainResult<()> {
        let len = login.chars().count();
        if !(3..=32).contains(&len) {
            return Err(DomainError::invalid_values("login must be 3-32 characters"));
        }
        if !login.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DomainError::invalid_values(
                "login may only contain letters, digits and underscores",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_verified_starts_clean() {
        let user = User::from_verified("Ada", "ada", "ada@x.io", "$2b$12$hash", Utc::now());
        assert_ne!(user.id, Uuid::nil());
        assert_eq!(user.avatar, "");
        assert_eq!(user.num_of_readmes, 0);
        assert_eq!(user.num_of_templates, 0);
        assert!(user.favorite_templates.is_empty());
    }

    #[test]
    fn test_password_not_serialized() {
        let user = User::from_verified("Ada", "ada", "ada@x.io", "$2b$12$hash", Utc::now());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("$2b$12$hash"));
        assert!(!json.contains("\"password\""));
    }

    #[test]
    fn test_login_validation() {
        assert!(User::validate_login("ada_lovelace").is_ok());
        assert!(User::validate_login("ab").is_err());
        assert!(User::validate_login("has space").is_err());
    }
}

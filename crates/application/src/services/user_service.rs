//! 用户服务

use domain::{DomainError, DomainResult, User};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::context::OpContext;
use crate::image_store::ImageStore;
use crate::password::PasswordHasher;
use crate::repository::{UpdateFields, UserRepository};

pub struct UserServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub image_store: Arc<dyn ImageStore>,
}

pub struct UserService {
    deps: UserServiceDependencies,
}

impl UserService {
    pub fn new(deps: UserServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<User> {
        self.deps.user_repository.get_by_id(&OpContext::new(), id).await
    }

    /// 白名单更新：nickname, login, email, avatar
    pub async fn update_profile(&self, user_id: Uuid, fields: UpdateFields) -> DomainResult<User> {
        if let Some(nickname) = fields.get("nickname").and_then(|v| v.as_str()) {
            User::validate_nickname(nickname)?;
        }
        if let Some(login) = fields.get("login").and_then(|v| v.as_str()) {
            User::validate_login(login)?;
        }
        self.deps
            .user_repository
            .update(&OpContext::new(), user_id, fields)
            .await
    }

    /// 上传头像到图床并写回 avatar 字段，返回新 URL
    pub async fn upload_avatar(
        &self,
        user_id: Uuid,
        bytes: Vec<u8>,
        filename: &str,
    ) -> DomainResult<String> {
        if bytes.is_empty() {
            return Err(DomainError::invalid_values("empty image upload"));
        }
        let url = self.deps.image_store.upload(bytes, filename).await?;

        let mut fields: UpdateFields = BTreeMap::new();
        fields.insert("avatar".to_string(), json!(url));
        self.deps
            .user_repository
            .update(&OpContext::new(), user_id, fields)
            .await?;
        Ok(url)
    }

    /// 删除账号需要当前密码确认
    pub async fn delete(&self, user_id: Uuid, password: &str) -> DomainResult<()> {
        let ctx = OpContext::new();
        let user = self.deps.user_repository.get_by_id(&ctx, user_id).await?;

        let matches = self
            .deps
            .password_hasher
            .verify(password, &user.password)
            .await?;
        if !matches {
            return Err(DomainError::Unauthorized);
        }

        self.deps.user_repository.delete(&ctx, user_id).await
    }
}

//! 登录认证服务
//!
//! 只负责凭据校验；JWT 的签发与 cookie 投递在交付层。

use domain::{DomainError, DomainResult, User};
use std::sync::Arc;

use crate::context::OpContext;
use crate::password::PasswordHasher;
use crate::repository::UserRepository;

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

pub struct AuthServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
}

pub struct AuthService {
    deps: AuthServiceDependencies,
}

impl AuthService {
    pub fn new(deps: AuthServiceDependencies) -> Self {
        Self { deps }
    }

    /// 按登录名取用户并校验密码；用户不存在与密码错误
    /// 对外都是 Unauthorized，不泄漏账号是否存在
    pub async fn login(&self, request: LoginRequest) -> DomainResult<User> {
        let ctx = OpContext::new();
        let user = match self
            .deps
            .user_repository
            .get_by_login(&ctx, &request.login)
            .await
        {
            Ok(user) => user,
            Err(DomainError::NotFound { .. }) => return Err(DomainError::Unauthorized),
            Err(err) => return Err(err),
        };

        let matches = self
            .deps
            .password_hasher
            .verify(&request.password, &user.password)
            .await?;
        if !matches {
            return Err(DomainError::Unauthorized);
        }

        Ok(user)
    }
}

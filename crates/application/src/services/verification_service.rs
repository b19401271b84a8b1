//! 验证与注册服务
//!
//! 两阶段注册状态机：
//! `ABSENT → PENDING → VERIFIED → ABSENT`，过期与尝试耗尽坍缩回
//! ABSENT。验证码只存 SHA-256 摘要；密码哈希在事务外完成。

use chrono::Duration as ChronoDuration;
use domain::{DomainError, DomainResult, User, Verification};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::code::{code_digest, generate_code};
use crate::context::OpContext;
use crate::mailer::Mailer;
use crate::password::PasswordHasher;
use crate::repository::{AttemptsOutcome, UserRepository, VerificationRepository};
use crate::transactor::Transactor;

#[derive(Debug, Clone)]
pub struct SendCodeRequest {
    pub nickname: String,
    pub login: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

/// 事务内的验证结果
///
/// 流程态（码错、耗尽、过期）不是失败：它们产生的递减与删除
/// 必须随事务提交，之后才翻译成对应的领域错误。
enum VerifyOutcome {
    Registered(User),
    Invalid,
    Exhausted,
    Expired,
    Missing,
}

pub struct VerificationServiceDependencies {
    pub verification_repository: Arc<dyn VerificationRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
    pub transactor: Arc<Transactor>,
    /// 验证码有效期
    pub code_ttl: Duration,
    /// 尝试次数预算
    pub attempts: i32,
}

fn code_ttl(ttl: Duration) -> ChronoDuration {
    ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::hours(24))
}

pub struct VerificationService {
    deps: VerificationServiceDependencies,
}

impl VerificationService {
    pub fn new(deps: VerificationServiceDependencies) -> Self {
        Self { deps }
    }

    /// 发起注册：ABSENT → PENDING
    ///
    /// 邮箱/登录名/昵称已被正式用户占用时拒绝；该邮箱已有待验证
    /// 记录时转入重发路径。验证码邮件在记录落库之后发送。
    pub async fn send_code(&self, request: SendCodeRequest) -> DomainResult<()> {
        User::validate_nickname(&request.nickname)?;
        User::validate_login(&request.login)?;

        let ctx = OpContext::new();
        if self
            .deps
            .user_repository
            .identity_taken(&ctx, &request.email, &request.login, &request.nickname)
            .await?
        {
            return Err(DomainError::already_exists("user"));
        }

        // bcrypt 在任何事务之外执行
        let password_hash = self.deps.password_hasher.hash(&request.password).await?;

        let code = generate_code();
        let now = self.deps.clock.now();
        let verification = Verification {
            email: request.email.clone(),
            login: request.login,
            nickname: request.nickname.clone(),
            password: password_hash.into_bytes(),
            code: code_digest(&code),
            expired_time: now + code_ttl(self.deps.code_ttl),
            attempts: self.deps.attempts,
        };

        match self
            .deps
            .verification_repository
            .create(&ctx, &verification)
            .await
        {
            Ok(()) => {}
            // 并发/重复的 send：同一邮箱已有记录，按重发处理
            Err(DomainError::AlreadyExists { .. }) => {
                self.deps
                    .verification_repository
                    .overwrite(
                        &ctx,
                        &verification.email,
                        &verification.code,
                        verification.expired_time,
                        verification.attempts,
                    )
                    .await?;
            }
            Err(err) => return Err(err),
        }

        self.deps
            .mailer
            .send_verification_code(&request.email, &request.nickname, &code)
            .await?;
        Ok(())
    }

    /// 重发验证码：PENDING → PENDING，记录不存在返回 NotFound
    pub async fn resend_code(&self, email: &str) -> DomainResult<()> {
        let ctx = OpContext::new();
        let pending = self
            .deps
            .verification_repository
            .get_by_email(&ctx, email)
            .await?;

        let code = generate_code();
        let now = self.deps.clock.now();
        let expired_time = now + code_ttl(self.deps.code_ttl);

        self.deps
            .verification_repository
            .overwrite(&ctx, email, &code_digest(&code), expired_time, self.deps.attempts)
            .await?;

        self.deps
            .mailer
            .send_verification_code(email, &pending.nickname, &code)
            .await?;
        Ok(())
    }

    /// 完成注册：PENDING → VERIFIED → ABSENT
    ///
    /// 单事务内：命中则建用户删记录；未命中则原子递减尝试次数，
    /// 递减触发检查约束时删记录并报尝试耗尽；命中但过期时删记录
    /// 并报过期。
    pub async fn verify(&self, request: VerifyRequest) -> DomainResult<User> {
        let digest = code_digest(&request.code);
        let now = self.deps.clock.now();
        let email = request.email;
        let verifications = self.deps.verification_repository.clone();
        let users = self.deps.user_repository.clone();

        let outcome = self
            .deps
            .transactor
            .within(&OpContext::new(), move |ctx| {
                Box::pin(async move {
                    let found = verifications
                        .find_by_email_and_code(&ctx, &email, &digest)
                        .await?;

                    let pending = match found {
                        None => {
                            return match verifications.decrement_attempts(&ctx, &email).await? {
                                AttemptsOutcome::Decremented => Ok(VerifyOutcome::Invalid),
                                AttemptsOutcome::Exhausted => {
                                    verifications.delete(&ctx, &email).await?;
                                    Ok(VerifyOutcome::Exhausted)
                                }
                                AttemptsOutcome::NotFound => Ok(VerifyOutcome::Missing),
                            };
                        }
                        Some(pending) => pending,
                    };

                    if pending.is_expired(now) {
                        verifications.delete(&ctx, &email).await?;
                        return Ok(VerifyOutcome::Expired);
                    }

                    let password_hash = String::from_utf8(pending.password.clone())
                        .map_err(|_| {
                            DomainError::storage(
                                "verification.verify",
                                "stored password hash is not valid utf-8",
                            )
                        })?;
                    let user = User::from_verified(
                        pending.nickname,
                        pending.login,
                        pending.email,
                        password_hash,
                        now,
                    );
                    let stored = users.create(&ctx, &user).await?;
                    verifications.delete(&ctx, &email).await?;
                    Ok(VerifyOutcome::Registered(stored))
                })
            })
            .await?;

        match outcome {
            VerifyOutcome::Registered(user) => Ok(user),
            VerifyOutcome::Invalid => Err(DomainError::InvalidCode),
            VerifyOutcome::Exhausted => Err(DomainError::ZeroAttempts),
            VerifyOutcome::Expired => Err(DomainError::CodeExpired),
            VerifyOutcome::Missing => Err(DomainError::not_found("verification")),
        }
    }
}

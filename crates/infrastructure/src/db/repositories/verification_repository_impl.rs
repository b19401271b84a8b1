//! 验证记录 Repository 实现
//!
//! attempts 递减是单条 UPDATE，依赖表上的 `attempts >= 0` 检查约束
//! 判定预算耗尽，不做读-改-写两次往返。验证码只以摘要落库。

use application::context::OpContext;
use application::repository::{AttemptsOutcome, VerificationRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{DomainError, DomainResult, Verification};
use sqlx::{query, query_as, FromRow, PgPool};

use crate::db::{is_check_violation, map_sqlx_err};

const VERIFICATION_COLUMNS: &str =
    "email, login, nickname, password, code, expired_time, attempts";

#[derive(Debug, FromRow)]
struct VerificationRecord {
    email: String,
    login: String,
    nickname: String,
    password: Vec<u8>,
    code: Vec<u8>,
    expired_time: DateTime<Utc>,
    attempts: i32,
}

impl From<VerificationRecord> for Verification {
    fn from(record: VerificationRecord) -> Self {
        Verification {
            email: record.email,
            login: record.login,
            nickname: record.nickname,
            password: record.password,
            code: record.code,
            expired_time: record.expired_time,
            attempts: record.attempts,
        }
    }
}

pub struct PgVerificationRepository {
    pool: PgPool,
}

impl PgVerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationRepository for PgVerificationRepository {
    async fn create(&self, ctx: &OpContext, verification: &Verification) -> DomainResult<()> {
        let sql = format!(
            "INSERT INTO verifications ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            VERIFICATION_COLUMNS
        );
        let q = query(&sql)
            .bind(&verification.email)
            .bind(&verification.login)
            .bind(&verification.nickname)
            .bind(&verification.password)
            .bind(&verification.code)
            .bind(verification.expired_time)
            .bind(verification.attempts);

        match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("verification.create", "verification", err))?;

        Ok(())
    }

    async fn get_by_email(&self, ctx: &OpContext, email: &str) -> DomainResult<Verification> {
        let sql = format!(
            "SELECT {} FROM verifications WHERE email = $1",
            VERIFICATION_COLUMNS
        );
        let q = query_as::<_, VerificationRecord>(&sql).bind(email.to_owned());
        let record = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_one(&mut **tx).await
            }
            None => q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("verification.get_by_email", "verification", err))?;
        Ok(record.into())
    }

    async fn overwrite(
        &self,
        ctx: &OpContext,
        email: &str,
        code: &[u8],
        expired_time: DateTime<Utc>,
        attempts: i32,
    ) -> DomainResult<()> {
        let q = query(
            "UPDATE verifications SET code = $2, expired_time = $3, attempts = $4 \
             WHERE email = $1",
        )
        .bind(email.to_owned())
        .bind(code.to_vec())
        .bind(expired_time)
        .bind(attempts);

        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("verification.overwrite", "verification", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("verification"));
        }
        Ok(())
    }

    async fn find_by_email_and_code(
        &self,
        ctx: &OpContext,
        email: &str,
        code: &[u8],
    ) -> DomainResult<Option<Verification>> {
        let sql = format!(
            "SELECT {} FROM verifications WHERE email = $1 AND code = $2",
            VERIFICATION_COLUMNS
        );
        let q = query_as::<_, VerificationRecord>(&sql)
            .bind(email.to_owned())
            .bind(code.to_vec());
        let record = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_optional(&mut **tx).await
            }
            None => q.fetch_optional(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("verification.find", "verification", err))?;

        Ok(record.map(Verification::from))
    }

    async fn decrement_attempts(
        &self,
        ctx: &OpContext,
        email: &str,
    ) -> DomainResult<AttemptsOutcome> {
        const DECREMENT_SQL: &str =
            "UPDATE verifications SET attempts = attempts - 1 WHERE email = $1";
        let op = "verification.decrement_attempts";

        let result = match ctx.tx() {
            Some(tx) => {
                // 检查约束触发会让整个事务进入 aborted 状态，
                // 用 savepoint 保住外层事务，后续的 DELETE 才能执行
                let mut tx = tx.lock().await;
                query("SAVEPOINT attempts_dec")
                    .execute(&mut **tx)
                    .await
                    .map_err(|err| map_sqlx_err(op, "verification", err))?;

                let result = query(DECREMENT_SQL)
                    .bind(email.to_owned())
                    .execute(&mut **tx)
                    .await;

                match &result {
                    Err(err) if is_check_violation(err) => {
                        query("ROLLBACK TO SAVEPOINT attempts_dec")
                            .execute(&mut **tx)
                            .await
                            .map_err(|err| map_sqlx_err(op, "verification", err))?;
                    }
                    _ => {
                        query("RELEASE SAVEPOINT attempts_dec")
                            .execute(&mut **tx)
                            .await
                            .map_err(|err| map_sqlx_err(op, "verification", err))?;
                    }
                }
                result
            }
            None => {
                query(DECREMENT_SQL)
                    .bind(email.to_owned())
                    .execute(&self.pool)
                    .await
            }
        };

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(AttemptsOutcome::NotFound),
            Ok(_) => Ok(AttemptsOutcome::Decremented),
            Err(err) if is_check_violation(&err) => Ok(AttemptsOutcome::Exhausted),
            Err(err) => Err(map_sqlx_err(op, "verification", err)),
        }
    }

    async fn delete(&self, ctx: &OpContext, email: &str) -> DomainResult<()> {
        let q = query("DELETE FROM verifications WHERE email = $1").bind(email.to_owned());
        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("verification.delete", "verification", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("verification"));
        }
        Ok(())
    }

    async fn purge_expired(&self, ctx: &OpContext, now: DateTime<Utc>) -> DomainResult<u64> {
        let q = query("DELETE FROM verifications WHERE expired_time <= $1").bind(now);
        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("verification.purge_expired", "verification", err))?;

        Ok(result.rows_affected())
    }
}

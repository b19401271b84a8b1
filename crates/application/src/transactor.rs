//! 事务执行器
//!
//! 打开一个关系库事务并把句柄放进派生上下文，执行调用方提供的块：
//! 块返回 Ok 则提交，Err 则回滚。提交与回滚使用独立的 5 秒期限，
//! 调用方被取消时事务仍会被释放。不嵌套：上下文里已有事务时复用。

use domain::{DomainError, DomainResult};
use futures_util::future::BoxFuture;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::context::{OpContext, TxHandle};

/// 提交/回滚的独立期限，与调用方的取消无关
const FINISH_DEADLINE: Duration = Duration::from_secs(5);

enum Backend {
    Pool(PgPool),
    /// 测试用：直接执行块，不产生事务
    #[cfg(test)]
    Detached,
}

/// 事务执行器
pub struct Transactor {
    backend: Backend,
}

impl Transactor {
    pub fn new(pool: PgPool) -> Self {
        Self {
            backend: Backend::Pool(pool),
        }
    }

    #[cfg(test)]
    pub fn detached() -> Self {
        Self {
            backend: Backend::Detached,
        }
    }

    /// 在事务内执行 `f`
    ///
    /// 上下文已携带事务时为幂等附着：同一事务内直接执行块，
    /// 提交仍归最外层调用。
    pub async fn within<T, F>(&self, ctx: &OpContext, f: F) -> DomainResult<T>
    where
        T: Send + 'static,
        F: FnOnce(OpContext) -> BoxFuture<'static, DomainResult<T>>,
    {
        if ctx.in_tx() {
            return f(ctx.clone()).await;
        }

        let pool = match &self.backend {
            Backend::Pool(pool) => pool,
            #[cfg(test)]
            Backend::Detached => return f(ctx.clone()).await,
        };

        let tx = pool
            .begin()
            .await
            .map_err(|err| DomainError::storage("tx.begin", err.to_string()))?;
        let handle: TxHandle = Arc::new(Mutex::new(tx));

        let result = f(OpContext::with_tx(handle.clone())).await;

        // 仓储持有的克隆都应随块结束而释放，这里收回唯一所有权
        let tx = match Arc::try_unwrap(handle) {
            Ok(mutex) => mutex.into_inner(),
            Err(_) => {
                return Err(DomainError::storage(
                    "tx.finish",
                    "transaction handle leaked past block",
                ))
            }
        };

        match result {
            Ok(value) => {
                finish(tx.commit(), "tx.commit").await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = finish(tx.rollback(), "tx.rollback").await {
                    tracing::error!(error = %rollback_err, "transaction rollback failed");
                }
                Err(err)
            }
        }
    }
}

async fn finish<F>(fut: F, op: &'static str) -> DomainResult<()>
where
    F: Future<Output = Result<(), sqlx::Error>>,
{
    match tokio::time::timeout(FINISH_DEADLINE, fut).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(DomainError::storage(op, err.to_string())),
        Err(_) => Err(DomainError::Timeout),
    }
}

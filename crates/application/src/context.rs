//! 请求作用域上下文
//!
//! 携带环境事务句柄。仓储通过检查上下文发现事务：有则用事务执行，
//! 无则直接走连接池。

use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 环境事务句柄
///
/// 句柄在事务块内被多个仓储克隆共享，块结束后由执行器收回所有权
/// 提交或回滚。
pub type TxHandle = Arc<Mutex<Transaction<'static, Postgres>>>;

/// 请求作用域操作上下文
#[derive(Clone, Default)]
pub struct OpContext {
    tx: Option<TxHandle>,
}

impl OpContext {
    /// 无事务上下文
    pub fn new() -> Self {
        Self { tx: None }
    }

    /// 携带事务的派生上下文
    pub fn with_tx(tx: TxHandle) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn tx(&self) -> Option<&TxHandle> {
        self.tx.as_ref()
    }

    pub fn in_tx(&self) -> bool {
        self.tx.is_some()
    }
}

impl std::fmt::Debug for OpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpContext")
            .field("in_tx", &self.in_tx())
            .finish()
    }
}

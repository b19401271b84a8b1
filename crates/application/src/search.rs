//! 全文索引端口
//!
//! 索引不是权威数据，由定时任务从关系库批量刷新。
//! 文档 id 即聚合 id。

use async_trait::async_trait;
use domain::DomainError;
use thiserror::Error;
use uuid::Uuid;

pub const TEMPLATES_INDEX: &str = "templates";
pub const WIDGETS_INDEX: &str = "widgets";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search backend error: {0}")]
    Backend(String),
}

impl SearchError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

impl From<SearchError> for DomainError {
    fn from(err: SearchError) -> Self {
        DomainError::storage("search", err.to_string())
    }
}

/// 全文索引
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// 幂等 upsert，按文档的 "id" 字段去重
    async fn upsert(&self, index: &str, docs: Vec<serde_json::Value>) -> Result<(), SearchError>;

    /// 查询并返回命中文档的 id 列表
    async fn search_ids(
        &self,
        index: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Uuid>, SearchError>;
}

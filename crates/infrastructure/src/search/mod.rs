//! Meilisearch 索引适配器
//!
//! 索引不是权威数据：upsert 按 id 幂等，不回收库里已不存在的文档。

use application::search::{SearchError, SearchIndex};
use async_trait::async_trait;
use meilisearch_sdk::client::Client;
use serde::Deserialize;
use uuid::Uuid;

/// 搜索命中只取 id，实体随后从缓存/库批量加载
#[derive(Debug, Deserialize)]
struct IdDoc {
    id: Uuid,
}

pub struct MeiliIndex {
    client: Client,
}

impl MeiliIndex {
    pub fn new(url: &str, api_key: &str) -> Result<Self, SearchError> {
        let client = Client::new(url, Some(api_key))
            .map_err(|err| SearchError::backend(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SearchIndex for MeiliIndex {
    async fn upsert(&self, index: &str, docs: Vec<serde_json::Value>) -> Result<(), SearchError> {
        if docs.is_empty() {
            return Ok(());
        }
        self.client
            .index(index)
            .add_or_update(&docs, Some("id"))
            .await
            .map_err(|err| SearchError::backend(err.to_string()))?;
        Ok(())
    }

    async fn search_ids(
        &self,
        index: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Uuid>, SearchError> {
        let results = self
            .client
            .index(index)
            .search()
            .with_query(query)
            .with_limit(limit)
            .execute::<IdDoc>()
            .await
            .map_err(|err| SearchError::backend(err.to_string()))?;

        Ok(results.hits.into_iter().map(|hit| hit.result.id).collect())
    }
}

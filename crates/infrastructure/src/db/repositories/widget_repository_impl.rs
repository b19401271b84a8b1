//! 挂件 Repository 实现
//!
//! 挂件同为缓存型聚合。实体固定 9 个字段，所有查询完整列出，
//! 列清单与模型不允许出现偏差。

use application::cache::KeyValueCache;
use application::context::OpContext;
use application::repository::{UpdateFields, WidgetRepository};
use async_trait::async_trait;
use domain::{DomainError, DomainResult, Page, Pagination, Widget};
use sqlx::types::Json;
use sqlx::{query, query_as, query_scalar, FromRow, PgPool};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::db::{bind_value, build_update_sql, map_sqlx_err};

const WIDGET_COLUMNS: &str =
    "id, title, image, description, widget_type, tags, link, likes, num_of_users";

const UPDATE_WHITELIST: &[&str] = &[
    "description",
    "image",
    "link",
    "tags",
    "title",
    "widget_type",
];

#[derive(Debug, FromRow)]
struct WidgetRecord {
    id: Uuid,
    title: String,
    image: String,
    description: String,
    widget_type: String,
    tags: Json<HashMap<String, String>>,
    link: String,
    likes: i64,
    num_of_users: i64,
}

impl From<WidgetRecord> for Widget {
    fn from(record: WidgetRecord) -> Self {
        Widget {
            id: record.id,
            title: record.title,
            image: record.image,
            description: record.description,
            widget_type: record.widget_type,
            tags: record.tags.0,
            link: record.link,
            likes: record.likes,
            num_of_users: record.num_of_users,
        }
    }
}

pub struct PgWidgetRepository {
    pool: PgPool,
    cache: Arc<dyn KeyValueCache>,
    default_ttl: Duration,
}

impl PgWidgetRepository {
    pub fn new(pool: PgPool, cache: Arc<dyn KeyValueCache>, default_ttl: Duration) -> Self {
        Self {
            pool,
            cache,
            default_ttl,
        }
    }

    async fn fetch_from_store(&self, ctx: &OpContext, id: Uuid) -> DomainResult<Widget> {
        let sql = format!("SELECT {} FROM widgets WHERE id = $1", WIDGET_COLUMNS);
        let q = query_as::<_, WidgetRecord>(&sql).bind(id);
        let record = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_one(&mut **tx).await
            }
            None => q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("widget.get_by_id", "widget", err))?;
        Ok(record.into())
    }

    async fn refresh_cache(&self, ctx: &OpContext, widget: &Widget) -> DomainResult<()> {
        let key = widget.id.to_string();
        let value = serde_json::to_string(widget)
            .map_err(|err| DomainError::storage("widget.cache", err.to_string()))?;

        match self.cache.refresh(&key, &value, self.default_ttl).await {
            Ok(()) => Ok(()),
            Err(err) if ctx.in_tx() => Err(err.into()),
            Err(err) => {
                tracing::warn!(widget_id = %widget.id, error = %err, "cache refresh failed");
                Ok(())
            }
        }
    }

    async fn bump(
        &self,
        ctx: &OpContext,
        op: &'static str,
        sql: &'static str,
        id: Uuid,
    ) -> DomainResult<()> {
        let q = query(sql).bind(id);
        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err(op, "widget", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("widget"));
        }

        let fresh = self.fetch_from_store(ctx, id).await?;
        self.refresh_cache(ctx, &fresh).await
    }
}

#[async_trait]
impl WidgetRepository for PgWidgetRepository {
    async fn get_by_id(&self, ctx: &OpContext, id: Uuid) -> DomainResult<Widget> {
        if ctx.in_tx() {
            return self.fetch_from_store(ctx, id).await;
        }

        let key = id.to_string();
        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Widget>(&raw) {
                Ok(widget) => return Ok(widget),
                Err(err) => {
                    tracing::warn!(widget_id = %id, error = %err, "corrupt cache entry, falling back");
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(widget_id = %id, error = %err, "cache read failed, falling back");
            }
        }

        let widget = self.fetch_from_store(ctx, id).await?;

        let value = serde_json::to_string(&widget)
            .map_err(|err| DomainError::storage("widget.cache", err.to_string()))?;
        if let Err(err) = self.cache.set(&key, &value, self.default_ttl).await {
            tracing::warn!(widget_id = %id, error = %err, "cache backfill failed");
        }

        Ok(widget)
    }

    async fn get_many(&self, ctx: &OpContext, ids: &[Uuid]) -> DomainResult<Vec<Widget>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: HashMap<Uuid, Widget> = HashMap::new();
        let mut missing: Vec<Uuid> = Vec::new();

        if ctx.in_tx() {
            missing = ids.to_vec();
        } else {
            for id in ids {
                match self.cache.get(&id.to_string()).await {
                    Ok(Some(raw)) => match serde_json::from_str::<Widget>(&raw) {
                        Ok(widget) => {
                            found.insert(*id, widget);
                        }
                        Err(_) => missing.push(*id),
                    },
                    _ => missing.push(*id),
                }
            }
        }

        if !missing.is_empty() {
            let sql = format!("SELECT {} FROM widgets WHERE id = ANY($1)", WIDGET_COLUMNS);
            let q = query_as::<_, WidgetRecord>(&sql).bind(&missing);
            let records = match ctx.tx() {
                Some(tx) => {
                    let mut tx = tx.lock().await;
                    q.fetch_all(&mut **tx).await
                }
                None => q.fetch_all(&self.pool).await,
            }
            .map_err(|err| map_sqlx_err("widget.get_many", "widget", err))?;

            for record in records {
                found.insert(record.id, record.into());
            }
        }

        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }

    async fn list(&self, ctx: &OpContext, pagination: Pagination) -> DomainResult<Page<Widget>> {
        let count_q = query_scalar::<_, i64>("SELECT COUNT(*) FROM widgets");
        let total = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                count_q.fetch_one(&mut **tx).await
            }
            None => count_q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("widget.list", "widget", err))?;

        let sql = format!(
            "SELECT {} FROM widgets ORDER BY title, id LIMIT $1 OFFSET $2",
            WIDGET_COLUMNS
        );
        let q = query_as::<_, WidgetRecord>(&sql)
            .bind(pagination.limit())
            .bind(pagination.offset());
        let records = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_all(&mut **tx).await
            }
            None => q.fetch_all(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("widget.list", "widget", err))?;

        let items = records.into_iter().map(Widget::from).collect();
        Ok(Page::new(items, total as u64, pagination))
    }

    async fn update(
        &self,
        ctx: &OpContext,
        id: Uuid,
        fields: UpdateFields,
    ) -> DomainResult<Widget> {
        let sql = build_update_sql("widgets", UPDATE_WHITELIST, &fields, "")?;

        let mut q = query(&sql);
        for value in fields.values() {
            q = bind_value(q, value)?;
        }
        q = q.bind(id);

        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("widget.update", "widget", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("widget"));
        }

        let fresh = self.fetch_from_store(ctx, id).await?;
        self.refresh_cache(ctx, &fresh).await?;
        Ok(fresh)
    }

    async fn increment_users(&self, ctx: &OpContext, ids: &[Uuid]) -> DomainResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let q = query("UPDATE widgets SET num_of_users = num_of_users + 1 WHERE id = ANY($1)")
            .bind(ids);
        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("widget.increment_users", "widget", err))?;

        if result.rows_affected() != ids.len() as u64 {
            return Err(DomainError::not_found("widget"));
        }

        for id in ids {
            let fresh = self.fetch_from_store(ctx, *id).await?;
            self.refresh_cache(ctx, &fresh).await?;
        }
        Ok(())
    }

    async fn add_like(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.bump(
            ctx,
            "widget.add_like",
            "UPDATE widgets SET likes = likes + 1 WHERE id = $1",
            id,
        )
        .await
    }

    async fn remove_like(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.bump(
            ctx,
            "widget.remove_like",
            "UPDATE widgets SET likes = GREATEST(likes - 1, 0) WHERE id = $1",
            id,
        )
        .await
    }

    async fn page_all(
        &self,
        ctx: &OpContext,
        limit: i64,
        offset: i64,
    ) -> DomainResult<Vec<Widget>> {
        let sql = format!(
            "SELECT {} FROM widgets ORDER BY id LIMIT $1 OFFSET $2",
            WIDGET_COLUMNS
        );
        let q = query_as::<_, WidgetRecord>(&sql).bind(limit).bind(offset);
        let records = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_all(&mut **tx).await
            }
            None => q.fetch_all(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("widget.page_all", "widget", err))?;

        Ok(records.into_iter().map(Widget::from).collect())
    }
}

//! 模板 Repository 实现
//!
//! 模板是缓存型聚合：读走 缓存 → 库 → 回填，写在库变更成功后
//! 按原剩余 TTL 刷新缓存。事务内直读数据库、缓存失败向上传播并
//! 中止事务；池上写时缓存失败只记日志（下次读会回填）。

use application::cache::KeyValueCache;
use application::context::OpContext;
use application::repository::{TemplateRepository, UpdateFields};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{DomainError, DomainResult, Page, Pagination, Template};
use sqlx::types::Json;
use sqlx::{query, query_as, query_scalar, FromRow, PgPool};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::db::{bind_value, build_update_sql, map_sqlx_err};

const TEMPLATE_COLUMNS: &str = "id, owner_id, title, image, description, text_blocks, links, \
     widgets, render_order, likes, num_of_users, created_at, last_updated_at, is_public";

const UPDATE_WHITELIST: &[&str] = &[
    "description",
    "image",
    "is_public",
    "links",
    "render_order",
    "text_blocks",
    "title",
    "widgets",
];

#[derive(Debug, FromRow)]
struct TemplateRecord {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    image: String,
    description: String,
    text_blocks: Vec<String>,
    links: Vec<String>,
    widgets: Json<HashMap<String, String>>,
    render_order: Vec<String>,
    likes: i64,
    num_of_users: i64,
    created_at: DateTime<Utc>,
    last_updated_at: DateTime<Utc>,
    is_public: bool,
}

impl From<TemplateRecord> for Template {
    fn from(record: TemplateRecord) -> Self {
        Template {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            image: record.image,
            description: record.description,
            text_blocks: record.text_blocks,
            links: record.links,
            widgets: record.widgets.0,
            render_order: record.render_order,
            likes: record.likes,
            num_of_users: record.num_of_users,
            created_at: record.created_at,
            last_updated_at: record.last_updated_at,
            is_public: record.is_public,
        }
    }
}

pub struct PgTemplateRepository {
    pool: PgPool,
    cache: Arc<dyn KeyValueCache>,
    default_ttl: Duration,
}

impl PgTemplateRepository {
    pub fn new(pool: PgPool, cache: Arc<dyn KeyValueCache>, default_ttl: Duration) -> Self {
        Self {
            pool,
            cache,
            default_ttl,
        }
    }

    async fn fetch_from_store(&self, ctx: &OpContext, id: Uuid) -> DomainResult<Template> {
        let sql = format!("SELECT {} FROM templates WHERE id = $1", TEMPLATE_COLUMNS);
        let q = query_as::<_, TemplateRecord>(&sql).bind(id);
        let record = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_one(&mut **tx).await
            }
            None => q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("template.get_by_id", "template", err))?;
        Ok(record.into())
    }

    /// 库写成功后的缓存刷新：保留剩余 TTL。
    /// 事务内失败传播（中止事务），池上失败记日志放行。
    async fn refresh_cache(&self, ctx: &OpContext, template: &Template) -> DomainResult<()> {
        let key = template.id.to_string();
        let value = serde_json::to_string(template)
            .map_err(|err| DomainError::storage("template.cache", err.to_string()))?;

        match self.cache.refresh(&key, &value, self.default_ttl).await {
            Ok(()) => Ok(()),
            Err(err) if ctx.in_tx() => Err(err.into()),
            Err(err) => {
                tracing::warn!(template_id = %template.id, error = %err, "cache refresh failed");
                Ok(())
            }
        }
    }

    /// 计数类单行增减 + 缓存刷新
    async fn bump(&self, ctx: &OpContext, op: &'static str, sql: &'static str, id: Uuid) -> DomainResult<()> {
        let q = query(sql).bind(id);
        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err(op, "template", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("template"));
        }

        let fresh = self.fetch_from_store(ctx, id).await?;
        self.refresh_cache(ctx, &fresh).await
    }

    fn template_page_sql(where_clause: &str) -> (String, String) {
        (
            format!("SELECT COUNT(*) FROM templates {}", where_clause),
            format!(
                "SELECT {} FROM templates {} ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
                TEMPLATE_COLUMNS, where_clause
            ),
        )
    }
}

#[async_trait]
impl TemplateRepository for PgTemplateRepository {
    async fn create(&self, ctx: &OpContext, template: &Template) -> DomainResult<Template> {
        let sql = format!(
            "INSERT INTO templates ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {}",
            TEMPLATE_COLUMNS, TEMPLATE_COLUMNS
        );
        let q = query_as::<_, TemplateRecord>(&sql)
            .bind(template.id)
            .bind(template.owner_id)
            .bind(&template.title)
            .bind(&template.image)
            .bind(&template.description)
            .bind(&template.text_blocks)
            .bind(&template.links)
            .bind(Json(template.widgets.clone()))
            .bind(&template.render_order)
            .bind(template.likes)
            .bind(template.num_of_users)
            .bind(template.created_at)
            .bind(template.last_updated_at)
            .bind(template.is_public);

        let record = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_one(&mut **tx).await
            }
            None => q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("template.create", "template", err))?;

        Ok(record.into())
    }

    async fn get_by_id(&self, ctx: &OpContext, id: Uuid) -> DomainResult<Template> {
        // 事务内不碰缓存：未提交状态不回填
        if ctx.in_tx() {
            return self.fetch_from_store(ctx, id).await;
        }

        let key = id.to_string();
        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Template>(&raw) {
                Ok(template) => return Ok(template),
                Err(err) => {
                    tracing::warn!(template_id = %id, error = %err, "corrupt cache entry, falling back");
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(template_id = %id, error = %err, "cache read failed, falling back");
            }
        }

        let template = self.fetch_from_store(ctx, id).await?;

        let value = serde_json::to_string(&template)
            .map_err(|err| DomainError::storage("template.cache", err.to_string()))?;
        if let Err(err) = self.cache.set(&key, &value, self.default_ttl).await {
            tracing::warn!(template_id = %id, error = %err, "cache backfill failed");
        }

        Ok(template)
    }

    async fn get_many(&self, ctx: &OpContext, ids: &[Uuid]) -> DomainResult<Vec<Template>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // 批量读：逐个尝试缓存，缺的合并回库取
        let mut found: HashMap<Uuid, Template> = HashMap::new();
        let mut missing: Vec<Uuid> = Vec::new();

        if ctx.in_tx() {
            missing = ids.to_vec();
        } else {
            for id in ids {
                match self.cache.get(&id.to_string()).await {
                    Ok(Some(raw)) => match serde_json::from_str::<Template>(&raw) {
                        Ok(template) => {
                            found.insert(*id, template);
                        }
                        Err(_) => missing.push(*id),
                    },
                    _ => missing.push(*id),
                }
            }
        }

        if !missing.is_empty() {
            let sql = format!(
                "SELECT {} FROM templates WHERE id = ANY($1)",
                TEMPLATE_COLUMNS
            );
            let q = query_as::<_, TemplateRecord>(&sql).bind(&missing);
            let records = match ctx.tx() {
                Some(tx) => {
                    let mut tx = tx.lock().await;
                    q.fetch_all(&mut **tx).await
                }
                None => q.fetch_all(&self.pool).await,
            }
            .map_err(|err| map_sqlx_err("template.get_many", "template", err))?;

            for record in records {
                found.insert(record.id, record.into());
            }
        }

        // 保持入参顺序，缺失的 id 跳过
        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }

    async fn list_public(
        &self,
        ctx: &OpContext,
        pagination: Pagination,
    ) -> DomainResult<Page<Template>> {
        let (count_sql, page_sql) = Self::template_page_sql("WHERE is_public");

        let count_q = query_scalar::<_, i64>(&count_sql);
        let total = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                count_q.fetch_one(&mut **tx).await
            }
            None => count_q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("template.list_public", "template", err))?;

        let q = query_as::<_, TemplateRecord>(&page_sql)
            .bind(pagination.limit())
            .bind(pagination.offset());
        let records = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_all(&mut **tx).await
            }
            None => q.fetch_all(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("template.list_public", "template", err))?;

        let items = records.into_iter().map(Template::from).collect();
        Ok(Page::new(items, total as u64, pagination))
    }

    async fn list_by_owner(
        &self,
        ctx: &OpContext,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> DomainResult<Page<Template>> {
        let count_q =
            query_scalar::<_, i64>("SELECT COUNT(*) FROM templates WHERE owner_id = $1")
                .bind(owner_id);
        let total = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                count_q.fetch_one(&mut **tx).await
            }
            None => count_q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("template.list_by_owner", "template", err))?;

        let sql = format!(
            "SELECT {} FROM templates WHERE owner_id = $1 \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
            TEMPLATE_COLUMNS
        );
        let q = query_as::<_, TemplateRecord>(&sql)
            .bind(owner_id)
            .bind(pagination.limit())
            .bind(pagination.offset());
        let records = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_all(&mut **tx).await
            }
            None => q.fetch_all(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("template.list_by_owner", "template", err))?;

        let items = records.into_iter().map(Template::from).collect();
        Ok(Page::new(items, total as u64, pagination))
    }

    async fn update(
        &self,
        ctx: &OpContext,
        id: Uuid,
        fields: UpdateFields,
    ) -> DomainResult<Template> {
        let sql = build_update_sql("templates", UPDATE_WHITELIST, &fields, ", last_updated_at = NOW()")?;

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
        .map_err(|err| map_sqlx_err("template.update", "template", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("template"));
        }

        let fresh = self.fetch_from_store(ctx, id).await?;
        self.refresh_cache(ctx, &fresh).await?;
        Ok(fresh)
    }

    async fn delete(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let q = query("DELETE FROM templates WHERE id = $1").bind(id);
        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("template.delete", "template", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("template"));
        }

        // 缓存删除尽力而为
        if let Err(err) = self.cache.delete(&id.to_string()).await {
            tracing::warn!(template_id = %id, error = %err, "cache delete failed");
        }
        Ok(())
    }

    async fn increment_users(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.bump(
            ctx,
            "template.increment_users",
            "UPDATE templates SET num_of_users = num_of_users + 1 WHERE id = $1",
            id,
        )
        .await
    }

    async fn add_like(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.bump(
            ctx,
            "template.add_like",
            "UPDATE templates SET likes = likes + 1 WHERE id = $1",
            id,
        )
        .await
    }

    async fn remove_like(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.bump(
            ctx,
            "template.remove_like",
            "UPDATE templates SET likes = GREATEST(likes - 1, 0) WHERE id = $1",
            id,
        )
        .await
    }

    async fn page_all(
        &self,
        ctx: &OpContext,
        limit: i64,
        offset: i64,
    ) -> DomainResult<Vec<Template>> {
        let sql = format!(
            "SELECT {} FROM templates ORDER BY id LIMIT $1 OFFSET $2",
            TEMPLATE_COLUMNS
        );
        let q = query_as::<_, TemplateRecord>(&sql).bind(limit).bind(offset);
        let records = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_all(&mut **tx).await
            }
            None => q.fetch_all(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("template.page_all", "template", err))?;

        Ok(records.into_iter().map(Template::from).collect())
    }
}

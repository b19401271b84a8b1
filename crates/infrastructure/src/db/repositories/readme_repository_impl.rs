//! Readme Repository 实现

use application::context::OpContext;
use application::repository::{ReadmeRepository, UpdateFields};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{DomainError, DomainResult, Page, Pagination, Readme};
use sqlx::types::Json;
use sqlx::{query, query_as, query_scalar, FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::{bind_value, build_update_sql, map_sqlx_err};

const README_COLUMNS: &str = "id, owner_id, template_id, title, image, text_blocks, links, \
     widgets, render_order, created_at, last_updated_at";

const UPDATE_WHITELIST: &[&str] = &[
    "image",
    "links",
    "render_order",
    "text_blocks",
    "title",
    "widgets",
];

#[derive(Debug, FromRow)]
struct ReadmeRecord {
    id: Uuid,
    owner_id: Uuid,
    template_id: Option<Uuid>,
    title: String,
    image: String,
    text_blocks: Vec<String>,
    links: Vec<String>,
    widgets: Json<HashMap<String, String>>,
    render_order: Vec<String>,
    created_at: DateTime<Utc>,
    last_updated_at: DateTime<Utc>,
}

impl From<ReadmeRecord> for Readme {
    fn from(record: ReadmeRecord) -> Self {
        Readme {
            id: record.id,
            owner_id: record.owner_id,
            template_id: record.template_id,
            title: record.title,
            image: record.image,
            text_blocks: record.text_blocks,
            links: record.links,
            widgets: record.widgets.0,
            render_order: record.render_order,
            created_at: record.created_at,
            last_updated_at: record.last_updated_at,
        }
    }
}

pub struct PgReadmeRepository {
    pool: PgPool,
}

impl PgReadmeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadmeRepository for PgReadmeRepository {
    async fn create(&self, ctx: &OpContext, readme: &Readme) -> DomainResult<Readme> {
        let sql = format!(
            "INSERT INTO readmes ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
            README_COLUMNS, README_COLUMNS
        );
        let q = query_as::<_, ReadmeRecord>(&sql)
            .bind(readme.id)
            .bind(readme.owner_id)
            .bind(readme.template_id)
            .bind(&readme.title)
            .bind(&readme.image)
            .bind(&readme.text_blocks)
            .bind(&readme.links)
            .bind(Json(readme.widgets.clone()))
            .bind(&readme.render_order)
            .bind(readme.created_at)
            .bind(readme.last_updated_at);

        let record = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_one(&mut **tx).await
            }
            None => q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("readme.create", "readme", err))?;

        Ok(record.into())
    }

    async fn get_by_id(&self, ctx: &OpContext, id: Uuid) -> DomainResult<Readme> {
        let sql = format!("SELECT {} FROM readmes WHERE id = $1", README_COLUMNS);
        let q = query_as::<_, ReadmeRecord>(&sql).bind(id);
        let record = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_one(&mut **tx).await
            }
            None => q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("readme.get_by_id", "readme", err))?;
        Ok(record.into())
    }

    async fn list_by_owner(
        &self,
        ctx: &OpContext,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> DomainResult<Page<Readme>> {
        let count_q = query_scalar::<_, i64>("SELECT COUNT(*) FROM readmes WHERE owner_id = $1")
            .bind(owner_id);
        let total = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                count_q.fetch_one(&mut **tx).await
            }
            None => count_q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("readme.list_by_owner", "readme", err))?;

        let sql = format!(
            "SELECT {} FROM readmes WHERE owner_id = $1 \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
            README_COLUMNS
        );
        let q = query_as::<_, ReadmeRecord>(&sql)
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
        .map_err(|err| map_sqlx_err("readme.list_by_owner", "readme", err))?;

        let items = records.into_iter().map(Readme::from).collect();
        Ok(Page::new(items, total as u64, pagination))
    }

    async fn update(
        &self,
        ctx: &OpContext,
        id: Uuid,
        fields: UpdateFields,
    ) -> DomainResult<Readme> {
        let sql = build_update_sql("readmes", UPDATE_WHITELIST, &fields, ", last_updated_at = NOW()")?;

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
        .map_err(|err| map_sqlx_err("readme.update", "readme", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("readme"));
        }

        self.get_by_id(ctx, id).await
    }

    async fn delete(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let q = query("DELETE FROM readmes WHERE id = $1").bind(id);
        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("readme.delete", "readme", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("readme"));
        }
        Ok(())
    }
}

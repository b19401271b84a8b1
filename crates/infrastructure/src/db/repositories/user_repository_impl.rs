//! 用户 Repository 实现

use application::context::OpContext;
use application::repository::{UpdateFields, UserRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{DomainError, DomainResult, User};
use sqlx::{query, query_as, query_scalar, FromRow, PgPool};
use uuid::Uuid;

use crate::db::{bind_value, build_update_sql, map_sqlx_err};

const USER_COLUMNS: &str = "id, nickname, login, email, password, avatar, registered_at, \
     num_of_readmes, num_of_templates, favorite_templates, favorite_widgets";

/// 可写列白名单
const UPDATE_WHITELIST: &[&str] = &["avatar", "email", "login", "nickname"];

/// 数据库用户行
#[derive(Debug, Clone, FromRow)]
struct UserRecord {
    id: Uuid,
    nickname: String,
    login: String,
    email: String,
    password: String,
    avatar: String,
    registered_at: DateTime<Utc>,
    num_of_readmes: i64,
    num_of_templates: i64,
    favorite_templates: Vec<Uuid>,
    favorite_widgets: Vec<Uuid>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            nickname: record.nickname,
            login: record.login,
            email: record.email,
            password: record.password,
            avatar: record.avatar,
            registered_at: record.registered_at,
            num_of_readmes: record.num_of_readmes,
            num_of_templates: record.num_of_templates,
            favorite_templates: record.favorite_templates,
            favorite_widgets: record.favorite_widgets,
        }
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_column(
        &self,
        ctx: &OpContext,
        op: &'static str,
        sql: &str,
        value: &str,
    ) -> DomainResult<User> {
        let q = query_as::<_, UserRecord>(sql).bind(value.to_owned());
        let record = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_one(&mut **tx).await
            }
            None => q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err(op, "user", err))?;
        Ok(record.into())
    }

    /// 收藏集合的成员变更；影响零行时区分"已是该状态"与"用户不存在"
    async fn mutate_favorites(
        &self,
        ctx: &OpContext,
        op: &'static str,
        sql: &'static str,
        user_id: Uuid,
        item_id: Uuid,
    ) -> DomainResult<bool> {
        let q = query(sql).bind(user_id).bind(item_id);
        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err(op, "user", err))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists_q = query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id);
        let exists = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                exists_q.fetch_one(&mut **tx).await
            }
            None => exists_q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err(op, "user", err))?;

        if exists {
            Ok(false)
        } else {
            Err(DomainError::not_found("user"))
        }
    }

    async fn bump_counter(
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
        .map_err(|err| map_sqlx_err(op, "user", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, ctx: &OpContext, user: &User) -> DomainResult<User> {
        let sql = format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {}",
            USER_COLUMNS, USER_COLUMNS
        );
        let q = query_as::<_, UserRecord>(&sql)
            .bind(user.id)
            .bind(&user.nickname)
            .bind(&user.login)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.avatar)
            .bind(user.registered_at)
            .bind(user.num_of_readmes)
            .bind(user.num_of_templates)
            .bind(&user.favorite_templates)
            .bind(&user.favorite_widgets);

        let record = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_one(&mut **tx).await
            }
            None => q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("user.create", "user", err))?;

        Ok(record.into())
    }

    async fn get_by_id(&self, ctx: &OpContext, id: Uuid) -> DomainResult<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let q = query_as::<_, UserRecord>(&sql).bind(id);
        let record = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_one(&mut **tx).await
            }
            None => q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("user.get_by_id", "user", err))?;
        Ok(record.into())
    }

    async fn get_by_login(&self, ctx: &OpContext, login: &str) -> DomainResult<User> {
        let sql = format!("SELECT {} FROM users WHERE login = $1", USER_COLUMNS);
        self.fetch_by_column(ctx, "user.get_by_login", &sql, login)
            .await
    }

    async fn get_by_email(&self, ctx: &OpContext, email: &str) -> DomainResult<User> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        self.fetch_by_column(ctx, "user.get_by_email", &sql, email)
            .await
    }

    async fn identity_taken(
        &self,
        ctx: &OpContext,
        email: &str,
        login: &str,
        nickname: &str,
    ) -> DomainResult<bool> {
        let q = query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR login = $2 OR nickname = $3)",
        )
        .bind(email.to_owned())
        .bind(login.to_owned())
        .bind(nickname.to_owned());

        match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.fetch_one(&mut **tx).await
            }
            None => q.fetch_one(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("user.identity_taken", "user", err))
    }

    async fn update(&self, ctx: &OpContext, id: Uuid, fields: UpdateFields) -> DomainResult<User> {
        let sql = build_update_sql("users", UPDATE_WHITELIST, &fields, "")?;

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
        .map_err(|err| map_sqlx_err("user.update", "user", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user"));
        }

        self.get_by_id(ctx, id).await
    }

    async fn delete(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let q = query("DELETE FROM users WHERE id = $1").bind(id);
        let result = match ctx.tx() {
            Some(tx) => {
                let mut tx = tx.lock().await;
                q.execute(&mut **tx).await
            }
            None => q.execute(&self.pool).await,
        }
        .map_err(|err| map_sqlx_err("user.delete", "user", err))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user"));
        }
        Ok(())
    }

    async fn increment_readmes(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.bump_counter(
            ctx,
            "user.increment_readmes",
            "UPDATE users SET num_of_readmes = num_of_readmes + 1 WHERE id = $1",
            id,
        )
        .await
    }

    async fn increment_templates(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.bump_counter(
            ctx,
            "user.increment_templates",
            "UPDATE users SET num_of_templates = num_of_templates + 1 WHERE id = $1",
            id,
        )
        .await
    }

    async fn decrement_readmes(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.bump_counter(
            ctx,
            "user.decrement_readmes",
            "UPDATE users SET num_of_readmes = GREATEST(num_of_readmes - 1, 0) WHERE id = $1",
            id,
        )
        .await
    }

    async fn decrement_templates(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.bump_counter(
            ctx,
            "user.decrement_templates",
            "UPDATE users SET num_of_templates = GREATEST(num_of_templates - 1, 0) WHERE id = $1",
            id,
        )
        .await
    }

    async fn add_favorite_template(
        &self,
        ctx: &OpContext,
        user_id: Uuid,
        template_id: Uuid,
    ) -> DomainResult<bool> {
        self.mutate_favorites(
            ctx,
            "user.add_favorite_template",
            "UPDATE users SET favorite_templates = array_append(favorite_templates, $2) \
             WHERE id = $1 AND NOT ($2 = ANY(favorite_templates))",
            user_id,
            template_id,
        )
        .await
    }

    async fn remove_favorite_template(
        &self,
        ctx: &OpContext,
        user_id: Uuid,
        template_id: Uuid,
    ) -> DomainResult<bool> {
        self.mutate_favorites(
            ctx,
            "user.remove_favorite_template",
            "UPDATE users SET favorite_templates = array_remove(favorite_templates, $2) \
             WHERE id = $1 AND $2 = ANY(favorite_templates)",
            user_id,
            template_id,
        )
        .await
    }

    async fn add_favorite_widget(
        &self,
        ctx: &OpContext,
        user_id: Uuid,
        widget_id: Uuid,
    ) -> DomainResult<bool> {
        self.mutate_favorites(
            ctx,
            "user.add_favorite_widget",
            "UPDATE users SET favorite_widgets = array_append(favorite_widgets, $2) \
             WHERE id = $1 AND NOT ($2 = ANY(favorite_widgets))",
            user_id,
            widget_id,
        )
        .await
    }

    async fn remove_favorite_widget(
        &self,
        ctx: &OpContext,
        user_id: Uuid,
        widget_id: Uuid,
    ) -> DomainResult<bool> {
        self.mutate_favorites(
            ctx,
            "user.remove_favorite_widget",
            "UPDATE users SET favorite_widgets = array_remove(favorite_widgets, $2) \
             WHERE id = $1 AND $2 = ANY(favorite_widgets)",
            user_id,
            widget_id,
        )
        .await
    }
}

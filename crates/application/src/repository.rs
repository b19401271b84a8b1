//! 仓储契约
//!
//! 每个聚合一个 trait，由基础设施层的 Postgres 实现承接。
//! 所有写方法接收 `&OpContext`：上下文里有事务就用事务，没有就走池。
//! 错误映射统一：唯一约束冲突 → AlreadyExists，更新/删除零行 →
//! NotFound，其余存储错误带操作标签包装。
//!
//! 更新协议：入参是 字段名 → 值 的映射。每个仓储声明可写列白名单，
//! 未知键在任何 I/O 之前以 InvalidFields 失败。SET 子句按键的排序
//! 顺序组装，id 参数排最后，单条语句执行。缓存型聚合（模板、挂件）
//! 更新成功后重读行并按原剩余 TTL 回写缓存。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{DomainResult, Page, Pagination, Readme, Template, User, Verification, Widget};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::context::OpContext;

/// 更新映射：BTreeMap 保证 SET 子句顺序稳定
pub type UpdateFields = BTreeMap<String, Value>;

/// 原子递减尝试次数的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptsOutcome {
    /// 递减成功，仍有余量
    Decremented,
    /// 递减会违反 attempts >= 0 检查约束：预算已经耗尽
    Exhausted,
    /// 该邮箱没有待验证记录
    NotFound,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, ctx: &OpContext, user: &User) -> DomainResult<User>;
    async fn get_by_id(&self, ctx: &OpContext, id: Uuid) -> DomainResult<User>;
    async fn get_by_login(&self, ctx: &OpContext, login: &str) -> DomainResult<User>;
    async fn get_by_email(&self, ctx: &OpContext, email: &str) -> DomainResult<User>;

    /// 邮箱、登录名或昵称任意一个已被占用即 true
    async fn identity_taken(
        &self,
        ctx: &OpContext,
        email: &str,
        login: &str,
        nickname: &str,
    ) -> DomainResult<bool>;

    /// 白名单：nickname, login, email, avatar
    async fn update(&self, ctx: &OpContext, id: Uuid, fields: UpdateFields) -> DomainResult<User>;
    async fn delete(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;

    async fn increment_readmes(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;
    async fn increment_templates(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;
    /// 计数回落，不会减到负数
    async fn decrement_readmes(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;
    async fn decrement_templates(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;

    /// 收藏集合的幂等成员操作，返回行是否真的发生了变化
    async fn add_favorite_template(
        &self,
        ctx: &OpContext,
        user_id: Uuid,
        template_id: Uuid,
    ) -> DomainResult<bool>;
    async fn remove_favorite_template(
        &self,
        ctx: &OpContext,
        user_id: Uuid,
        template_id: Uuid,
    ) -> DomainResult<bool>;
    async fn add_favorite_widget(
        &self,
        ctx: &OpContext,
        user_id: Uuid,
        widget_id: Uuid,
    ) -> DomainResult<bool>;
    async fn remove_favorite_widget(
        &self,
        ctx: &OpContext,
        user_id: Uuid,
        widget_id: Uuid,
    ) -> DomainResult<bool>;
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, ctx: &OpContext, template: &Template) -> DomainResult<Template>;

    /// 读路径：缓存 → 未命中 → 库 → 按默认 TTL 回填。
    /// 事务内直读数据库，不碰缓存。
    async fn get_by_id(&self, ctx: &OpContext, id: Uuid) -> DomainResult<Template>;
    async fn get_many(&self, ctx: &OpContext, ids: &[Uuid]) -> DomainResult<Vec<Template>>;

    async fn list_public(
        &self,
        ctx: &OpContext,
        pagination: Pagination,
    ) -> DomainResult<Page<Template>>;
    async fn list_by_owner(
        &self,
        ctx: &OpContext,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> DomainResult<Page<Template>>;

    /// 白名单：title, image, description, text_blocks, links, widgets,
    /// render_order, is_public。`last_updated_at` 由实现置为 NOW()
    async fn update(
        &self,
        ctx: &OpContext,
        id: Uuid,
        fields: UpdateFields,
    ) -> DomainResult<Template>;
    async fn delete(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;

    async fn increment_users(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;
    async fn add_like(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;
    /// 不会把计数减到负数
    async fn remove_like(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;

    /// 批量索引分页读，按 id 升序
    async fn page_all(
        &self,
        ctx: &OpContext,
        limit: i64,
        offset: i64,
    ) -> DomainResult<Vec<Template>>;
}

#[async_trait]
pub trait WidgetRepository: Send + Sync {
    /// 读路径同模板：缓存 → 库 → 回填；事务内直读库
    async fn get_by_id(&self, ctx: &OpContext, id: Uuid) -> DomainResult<Widget>;
    async fn get_many(&self, ctx: &OpContext, ids: &[Uuid]) -> DomainResult<Vec<Widget>>;
    async fn list(&self, ctx: &OpContext, pagination: Pagination) -> DomainResult<Page<Widget>>;

    /// 白名单：title, image, description, widget_type, tags, link
    async fn update(&self, ctx: &OpContext, id: Uuid, fields: UpdateFields)
        -> DomainResult<Widget>;

    /// 一条语句内批量递增
    async fn increment_users(&self, ctx: &OpContext, ids: &[Uuid]) -> DomainResult<()>;
    async fn add_like(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;
    async fn remove_like(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;

    async fn page_all(&self, ctx: &OpContext, limit: i64, offset: i64)
        -> DomainResult<Vec<Widget>>;
}

#[async_trait]
pub trait ReadmeRepository: Send + Sync {
    async fn create(&self, ctx: &OpContext, readme: &Readme) -> DomainResult<Readme>;
    async fn get_by_id(&self, ctx: &OpContext, id: Uuid) -> DomainResult<Readme>;
    async fn list_by_owner(
        &self,
        ctx: &OpContext,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> DomainResult<Page<Readme>>;

    /// 白名单：title, image, text_blocks, links, widgets, render_order。
    /// `last_updated_at` 由实现置为 NOW()
    async fn update(&self, ctx: &OpContext, id: Uuid, fields: UpdateFields)
        -> DomainResult<Readme>;
    async fn delete(&self, ctx: &OpContext, id: Uuid) -> DomainResult<()>;
}

#[async_trait]
pub trait VerificationRepository: Send + Sync {
    /// 插入待验证记录；邮箱已有记录时返回 AlreadyExists，
    /// 调用方转入重发路径
    async fn create(&self, ctx: &OpContext, verification: &Verification) -> DomainResult<()>;

    async fn get_by_email(&self, ctx: &OpContext, email: &str) -> DomainResult<Verification>;

    /// 重发：按邮箱覆盖验证码摘要、过期时间与尝试次数；
    /// 记录不存在返回 NotFound
    async fn overwrite(
        &self,
        ctx: &OpContext,
        email: &str,
        code: &[u8],
        expired_time: DateTime<Utc>,
        attempts: i32,
    ) -> DomainResult<()>;

    /// 按 (email, 验证码摘要) 等值查找
    async fn find_by_email_and_code(
        &self,
        ctx: &OpContext,
        email: &str,
        code: &[u8],
    ) -> DomainResult<Option<Verification>>;

    /// 单条 UPDATE 原子递减，依赖 attempts >= 0 检查约束，
    /// 不允许读-改-写两次往返
    async fn decrement_attempts(
        &self,
        ctx: &OpContext,
        email: &str,
    ) -> DomainResult<AttemptsOutcome>;

    async fn delete(&self, ctx: &OpContext, email: &str) -> DomainResult<()>;

    /// 删除所有 expired_time <= now 的记录，返回删除条数
    async fn purge_expired(&self, ctx: &OpContext, now: DateTime<Utc>) -> DomainResult<u64>;
}

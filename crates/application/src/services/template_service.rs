//! 模板服务
//!
//! 创建走事务（模板插入 + 作者计数），点赞/取消赞是收藏集合成员
//! 变更加计数增减的事务组合，按成员变更结果保证幂等。

use domain::{DomainError, DomainResult, Page, Pagination, Template};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::context::OpContext;
use crate::repository::{TemplateRepository, UpdateFields, UserRepository};
use crate::search::{SearchIndex, TEMPLATES_INDEX};
use crate::transactor::Transactor;

/// 搜索返回的最大条数
const SEARCH_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct CreateTemplateRequest {
    pub title: String,
    pub image: String,
    pub description: String,
    pub text_blocks: Vec<String>,
    pub links: Vec<String>,
    pub widgets: HashMap<String, String>,
    pub render_order: Vec<String>,
    pub is_public: bool,
}

pub struct TemplateServiceDependencies {
    pub template_repository: Arc<dyn TemplateRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub search_index: Arc<dyn SearchIndex>,
    pub clock: Arc<dyn Clock>,
    pub transactor: Arc<Transactor>,
}

pub struct TemplateService {
    deps: TemplateServiceDependencies,
}

impl TemplateService {
    pub fn new(deps: TemplateServiceDependencies) -> Self {
        Self { deps }
    }

    /// 创建模板并递增作者的模板计数，同一事务
    pub async fn create(
        &self,
        owner_id: Uuid,
        request: CreateTemplateRequest,
    ) -> DomainResult<Template> {
        if request.title.trim().is_empty() {
            return Err(DomainError::invalid_values("title must not be empty"));
        }

        let now = self.deps.clock.now();
        let template = Template {
            id: Uuid::new_v4(),
            owner_id,
            title: request.title,
            image: request.image,
            description: request.description,
            text_blocks: request.text_blocks,
            links: request.links,
            widgets: request.widgets,
            render_order: request.render_order,
            likes: 0,
            num_of_users: 0,
            created_at: now,
            last_updated_at: now,
            is_public: request.is_public,
        };

        let templates = self.deps.template_repository.clone();
        let users = self.deps.user_repository.clone();

        self.deps
            .transactor
            .within(&OpContext::new(), move |ctx| {
                Box::pin(async move {
                    let stored = templates.create(&ctx, &template).await?;
                    users.increment_templates(&ctx, owner_id).await?;
                    Ok(stored)
                })
            })
            .await
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Template> {
        self.deps
            .template_repository
            .get_by_id(&OpContext::new(), id)
            .await
    }

    pub async fn list(&self, pagination: Pagination) -> DomainResult<Page<Template>> {
        self.deps
            .template_repository
            .list_public(&OpContext::new(), pagination)
            .await
    }

    pub async fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> DomainResult<Page<Template>> {
        self.deps
            .template_repository
            .list_by_owner(&OpContext::new(), owner_id, pagination)
            .await
    }

    /// 白名单更新；非所有者拒绝。缓存按原 TTL 刷新由仓储完成
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: UpdateFields,
    ) -> DomainResult<Template> {
        let ctx = OpContext::new();
        let current = self.deps.template_repository.get_by_id(&ctx, id).await?;
        if current.owner_id != user_id {
            return Err(DomainError::Forbidden);
        }
        self.deps.template_repository.update(&ctx, id, fields).await
    }

    /// 删除模板并回落作者计数，同一事务
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let ctx = OpContext::new();
        let current = self.deps.template_repository.get_by_id(&ctx, id).await?;
        if current.owner_id != user_id {
            return Err(DomainError::Forbidden);
        }

        let templates = self.deps.template_repository.clone();
        let users = self.deps.user_repository.clone();
        let owner_id = current.owner_id;

        self.deps
            .transactor
            .within(&ctx, move |ctx| {
                Box::pin(async move {
                    templates.delete(&ctx, id).await?;
                    users.decrement_templates(&ctx, owner_id).await?;
                    Ok(())
                })
            })
            .await
    }

    /// 点赞：收藏集合加入成功才递增计数；重复点赞是无操作
    pub async fn like(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let templates = self.deps.template_repository.clone();
        let users = self.deps.user_repository.clone();

        self.deps
            .transactor
            .within(&OpContext::new(), move |ctx| {
                Box::pin(async move {
                    // 先确认目标存在，收藏悬空 id 没有意义
                    templates.get_by_id(&ctx, id).await?;
                    if users.add_favorite_template(&ctx, user_id, id).await? {
                        templates.add_like(&ctx, id).await?;
                    }
                    Ok(())
                })
            })
            .await
    }

    /// 取消赞：集合移除成功才递减；计数不会为负
    pub async fn dislike(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let templates = self.deps.template_repository.clone();
        let users = self.deps.user_repository.clone();

        self.deps
            .transactor
            .within(&OpContext::new(), move |ctx| {
                Box::pin(async move {
                    if users.remove_favorite_template(&ctx, user_id, id).await? {
                        templates.remove_like(&ctx, id).await?;
                    }
                    Ok(())
                })
            })
            .await
    }

    /// 全文搜索：索引给 id，实体从缓存/库批量取
    pub async fn search(&self, query: &str) -> DomainResult<Vec<Template>> {
        let ids = self
            .deps
            .search_index
            .search_ids(TEMPLATES_INDEX, query, SEARCH_LIMIT)
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.deps
            .template_repository
            .get_many(&OpContext::new(), &ids)
            .await
    }
}

//! Readme 服务
//!
//! 从模板创建 readme 是系统里最宽的事务：模板计数、每个挂件的
//! 计数、作者的 readme 计数和插入本身要么全部生效要么全部回滚。

use domain::{DomainError, DomainResult, Page, Pagination, Readme};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::context::OpContext;
use crate::repository::{
    ReadmeRepository, TemplateRepository, UpdateFields, UserRepository, WidgetRepository,
};
use crate::transactor::Transactor;

#[derive(Debug, Clone)]
pub struct CreateReadmeRequest {
    pub template_id: Option<Uuid>,
    pub title: String,
    pub image: String,
    pub text_blocks: Vec<String>,
    pub links: Vec<String>,
    pub widgets: HashMap<String, String>,
    pub render_order: Vec<String>,
}

pub struct ReadmeServiceDependencies {
    pub readme_repository: Arc<dyn ReadmeRepository>,
    pub template_repository: Arc<dyn TemplateRepository>,
    pub widget_repository: Arc<dyn WidgetRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub clock: Arc<dyn Clock>,
    pub transactor: Arc<Transactor>,
}

pub struct ReadmeService {
    deps: ReadmeServiceDependencies,
}

impl ReadmeService {
    pub fn new(deps: ReadmeServiceDependencies) -> Self {
        Self { deps }
    }

    /// 创建 readme
    ///
    /// 单事务内：确认作者 → 模板存在则递增其 num_of_users →
    /// 批量确认引用的挂件全部存在并逐个递增 → 插入 readme →
    /// 递增作者 num_of_readmes。
    pub async fn create(
        &self,
        owner_id: Uuid,
        request: CreateReadmeRequest,
    ) -> DomainResult<Readme> {
        if request.title.trim().is_empty() {
            return Err(DomainError::invalid_values("title must not be empty"));
        }

        let now = self.deps.clock.now();
        let readme = Readme {
            id: Uuid::new_v4(),
            owner_id,
            template_id: request.template_id,
            title: request.title,
            image: request.image,
            text_blocks: request.text_blocks,
            links: request.links,
            widgets: request.widgets,
            render_order: request.render_order,
            created_at: now,
            last_updated_at: now,
        };

        let readmes = self.deps.readme_repository.clone();
        let templates = self.deps.template_repository.clone();
        let widgets = self.deps.widget_repository.clone();
        let users = self.deps.user_repository.clone();

        self.deps
            .transactor
            .within(&OpContext::new(), move |ctx| {
                Box::pin(async move {
                    users.get_by_id(&ctx, owner_id).await?;

                    if let Some(template_id) = readme.template_id {
                        templates.get_by_id(&ctx, template_id).await?;
                        templates.increment_users(&ctx, template_id).await?;
                    }

                    let widget_ids = readme.widget_ids();
                    if !widget_ids.is_empty() {
                        let found = widgets.get_many(&ctx, &widget_ids).await?;
                        if found.len() != widget_ids.len() {
                            return Err(DomainError::not_found("widget"));
                        }
                        widgets.increment_users(&ctx, &widget_ids).await?;
                    }

                    let stored = readmes.create(&ctx, &readme).await?;
                    users.increment_readmes(&ctx, owner_id).await?;
                    Ok(stored)
                })
            })
            .await
    }

    /// readme 只对所有者可见
    pub async fn get(&self, user_id: Uuid, id: Uuid) -> DomainResult<Readme> {
        let readme = self
            .deps
            .readme_repository
            .get_by_id(&OpContext::new(), id)
            .await?;
        if readme.owner_id != user_id {
            return Err(DomainError::Forbidden);
        }
        Ok(readme)
    }

    pub async fn list_own(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> DomainResult<Page<Readme>> {
        self.deps
            .readme_repository
            .list_by_owner(&OpContext::new(), user_id, pagination)
            .await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: UpdateFields,
    ) -> DomainResult<Readme> {
        let ctx = OpContext::new();
        let current = self.deps.readme_repository.get_by_id(&ctx, id).await?;
        if current.owner_id != user_id {
            return Err(DomainError::Forbidden);
        }
        self.deps.readme_repository.update(&ctx, id, fields).await
    }

    /// 删除并回落作者计数，同一事务
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let ctx = OpContext::new();
        let current = self.deps.readme_repository.get_by_id(&ctx, id).await?;
        if current.owner_id != user_id {
            return Err(DomainError::Forbidden);
        }

        let readmes = self.deps.readme_repository.clone();
        let users = self.deps.user_repository.clone();

        self.deps
            .transactor
            .within(&ctx, move |ctx| {
                Box::pin(async move {
                    readmes.delete(&ctx, id).await?;
                    users.decrement_readmes(&ctx, user_id).await?;
                    Ok(())
                })
            })
            .await
    }
}

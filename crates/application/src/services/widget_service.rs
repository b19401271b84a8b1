//! 挂件服务
//!
//! 挂件目录不经 API 创建或删除；这里只有读、点赞与目录维护用的
//! 白名单更新。

use domain::{DomainResult, Page, Pagination, Widget};
use std::sync::Arc;
use uuid::Uuid;

use crate::context::OpContext;
use crate::repository::{UpdateFields, UserRepository, WidgetRepository};
use crate::search::{SearchIndex, WIDGETS_INDEX};
use crate::transactor::Transactor;

const SEARCH_LIMIT: usize = 50;

pub struct WidgetServiceDependencies {
    pub widget_repository: Arc<dyn WidgetRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub search_index: Arc<dyn SearchIndex>,
    pub transactor: Arc<Transactor>,
}

pub struct WidgetService {
    deps: WidgetServiceDependencies,
}

impl WidgetService {
    pub fn new(deps: WidgetServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Widget> {
        self.deps
            .widget_repository
            .get_by_id(&OpContext::new(), id)
            .await
    }

    pub async fn list(&self, pagination: Pagination) -> DomainResult<Page<Widget>> {
        self.deps
            .widget_repository
            .list(&OpContext::new(), pagination)
            .await
    }

    /// 目录维护入口，不暴露为公开路由
    pub async fn update(&self, id: Uuid, fields: UpdateFields) -> DomainResult<Widget> {
        self.deps
            .widget_repository
            .update(&OpContext::new(), id, fields)
            .await
    }

    pub async fn like(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let widgets = self.deps.widget_repository.clone();
        let users = self.deps.user_repository.clone();

        self.deps
            .transactor
            .within(&OpContext::new(), move |ctx| {
                Box::pin(async move {
                    widgets.get_by_id(&ctx, id).await?;
                    if users.add_favorite_widget(&ctx, user_id, id).await? {
                        widgets.add_like(&ctx, id).await?;
                    }
                    Ok(())
                })
            })
            .await
    }

    pub async fn dislike(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let widgets = self.deps.widget_repository.clone();
        let users = self.deps.user_repository.clone();

        self.deps
            .transactor
            .within(&OpContext::new(), move |ctx| {
                Box::pin(async move {
                    if users.remove_favorite_widget(&ctx, user_id, id).await? {
                        widgets.remove_like(&ctx, id).await?;
                    }
                    Ok(())
                })
            })
            .await
    }

    pub async fn search(&self, query: &str) -> DomainResult<Vec<Widget>> {
        let ids = self
            .deps
            .search_index
            .search_ids(WIDGETS_INDEX, query, SEARCH_LIMIT)
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.deps
            .widget_repository
            .get_many(&OpContext::new(), &ids)
            .await
    }
}

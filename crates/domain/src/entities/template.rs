//! 模板实体定义
//!
//! 模板由用户创建，可公开进入目录，被 readme 引用。
//! 缓存中的值就是本结构的 JSON 投影。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 模板实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    /// 创建者
    pub owner_id: Uuid,
    pub title: String,
    /// 预览图 URL
    pub image: String,
    pub description: String,
    /// 文本块 id 列表
    pub text_blocks: Vec<String>,
    /// 链接 id 列表
    pub links: Vec<String>,
    /// widget-id → 槽位
    pub widgets: HashMap<String, String>,
    /// 渲染顺序
    pub render_order: Vec<String>,
    pub likes: i64,
    /// 以此模板创建过 readme 的次数
    pub num_of_users: i64,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub is_public: bool,
}

impl Template {
    /// 引用的挂件 id 集合（解析失败的键忽略）
    pub fn widget_ids(&self) -> Vec<Uuid> {
        self.widgets
            .keys()
            .filter_map(|k| Uuid::parse_str(k).ok())
            .collect()
    }
}

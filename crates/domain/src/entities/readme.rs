//! Readme 实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 用户组装出的 readme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readme {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// 来源模板，可为空
    pub template_id: Option<Uuid>,
    pub title: String,
    pub image: String,
    pub text_blocks: Vec<String>,
    pub links: Vec<String>,
    /// widget-id → 槽位
    pub widgets: HashMap<String, String>,
    pub render_order: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl Readme {
    /// 引用的挂件 id 集合
    pub fn widget_ids(&self) -> Vec<Uuid> {
        self.widgets
            .keys()
            .filter_map(|k| Uuid::parse_str(k).ok())
            .collect()
    }
}

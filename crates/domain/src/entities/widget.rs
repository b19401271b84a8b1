//! 挂件实体定义
//!
//! 挂件是目录维护的目录项，不通过 API 创建或删除。
//! 9 个字段，所有查询必须完整列出。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 挂件实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: Uuid,
    pub title: String,
    pub image: String,
    pub description: String,
    /// 挂件类别，如 "stats" / "badge"
    pub widget_type: String,
    /// 自由标签
    pub tags: HashMap<String, String>,
    /// 指向挂件源的链接
    pub link: String,
    pub likes: i64,
    /// 被 readme 引用的次数
    pub num_of_users: i64,
}

//! 验证记录实体
//!
//! 注册的第一阶段产物：持有待注册用户的凭据、一次性验证码摘要、
//! 过期时间与剩余尝试次数。每个邮箱同一时刻至多一条。
//! 状态机：ABSENT → PENDING → VERIFIED → ABSENT，
//! 过期与次数耗尽是坍缩回 ABSENT 的终态侧枝。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 待验证的注册记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    /// 邮箱，主键
    pub email: String,
    pub login: String,
    pub nickname: String,
    /// bcrypt 后的密码
    #[serde(skip_serializing, default)]
    pub password: Vec<u8>,
    /// 验证码的 SHA-256 摘要，原始码不落库
    #[serde(skip_serializing, default)]
    pub code: Vec<u8>,
    /// 过期时间
    pub expired_time: DateTime<Utc>,
    /// 剩余尝试次数，数据库层有 attempts >= 0 约束
    pub attempts: i32,
}

impl Verification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expired_time <= now
    }
}

//! 基础设施层
//!
//! 三个外部状态存储的适配器（PostgreSQL / Redis / Meilisearch）、
//! SMTP 邮件发送与云图床客户端。

pub mod cloudstorage;
pub mod db;
pub mod mailer;
pub mod redis;
pub mod search;

pub use cloudstorage::CloudinaryImageStore;
pub use db::repositories::{
    PgReadmeRepository, PgTemplateRepository, PgUserRepository, PgVerificationRepository,
    PgWidgetRepository,
};
pub use db::{create_pool, DbPool};
pub use mailer::SmtpMailer;
pub use redis::RedisCache;
pub use search::MeiliIndex;

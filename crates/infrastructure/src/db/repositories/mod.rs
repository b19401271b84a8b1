//! 各聚合的 PostgreSQL 仓储实现
//!
//! 写方法都接收 `&OpContext`：上下文携带事务就用事务连接，
//! 否则直接走连接池。

pub mod readme_repository_impl;
pub mod template_repository_impl;
pub mod user_repository_impl;
pub mod verification_repository_impl;
pub mod widget_repository_impl;

pub use readme_repository_impl::PgReadmeRepository;
pub use template_repository_impl::PgTemplateRepository;
pub use user_repository_impl::PgUserRepository;
pub use verification_repository_impl::PgVerificationRepository;
pub use widget_repository_impl::PgWidgetRepository;

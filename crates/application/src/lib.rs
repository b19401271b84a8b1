//! 应用层
//!
//! 端口（缓存、搜索、邮件、图床、密码、时钟）、仓储契约、
//! 事务执行器与各聚合服务的编排逻辑。

pub mod cache;
pub mod clock;
pub mod code;
pub mod context;
pub mod image_store;
pub mod mailer;
pub mod password;
pub mod repository;
pub mod scheduler;
pub mod search;
pub mod services;
pub mod transactor;

pub use cache::{CacheError, KeyValueCache};
pub use clock::{Clock, SystemClock};
pub use context::{OpContext, TxHandle};
pub use image_store::{ImageStore, ImageStoreError};
pub use mailer::{Mailer, MailerError};
pub use password::{BcryptPasswordHasher, PasswordHasher, PasswordHasherError};
pub use repository::{
    AttemptsOutcome, ReadmeRepository, TemplateRepository, UserRepository,
    VerificationRepository, WidgetRepository,
};
pub use scheduler::Scheduler;
pub use search::{SearchError, SearchIndex, TEMPLATES_INDEX, WIDGETS_INDEX};
pub use transactor::Transactor;

//! 领域模型层
//!
//! 聚合实体、错误分类和分页类型。不依赖任何存储或网络实现。

pub mod entities;
pub mod errors;
pub mod pagination;

pub use entities::readme::Readme;
pub use entities::template::Template;
pub use entities::user::User;
pub use entities::verification::Verification;
pub use entities::widget::Widget;
pub use errors::{DomainError, DomainResult};
pub use pagination::{Page, Pagination};

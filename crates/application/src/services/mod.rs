//! 应用服务
//!
//! 薄编排层：组合仓储完成跨聚合写入，事务经由 Transactor。

pub mod auth_service;
pub mod readme_service;
pub mod template_service;
pub mod user_service;
pub mod verification_service;
pub mod widget_service;

pub use auth_service::{AuthService, AuthServiceDependencies, LoginRequest};
pub use readme_service::{CreateReadmeRequest, ReadmeService, ReadmeServiceDependencies};
pub use template_service::{
    CreateTemplateRequest, TemplateService, TemplateServiceDependencies,
};
pub use user_service::{UserService, UserServiceDependencies};
pub use verification_service::{
    SendCodeRequest, VerificationService, VerificationServiceDependencies, VerifyRequest,
};
pub use widget_service::{WidgetService, WidgetServiceDependencies};

#[cfg(test)]
pub(crate) mod test_support;

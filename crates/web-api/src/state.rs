use std::sync::Arc;

use application::services::{
    AuthService, ReadmeService, TemplateService, UserService, VerificationService, WidgetService,
};

use crate::auth::JwtService;
use crate::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub verification_service: Arc<VerificationService>,
    pub auth_service: Arc<AuthService>,
    pub template_service: Arc<TemplateService>,
    pub widget_service: Arc<WidgetService>,
    pub readme_service: Arc<ReadmeService>,
    pub user_service: Arc<UserService>,
    pub jwt_service: Arc<JwtService>,
    pub rate_limiter: Arc<RateLimiter>,
}

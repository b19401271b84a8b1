//! HTTP 交付层
//!
//! axum 路由、JWT cookie 认证、限流与错误翻译。

pub mod auth;
pub mod error;
pub mod extract;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use auth::{Claims, JwtService, JWT_COOKIE};
pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use routes::router;
pub use state::AppState;

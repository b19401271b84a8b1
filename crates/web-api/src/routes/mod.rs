//! 路由表
//!
//! 全部业务路由挂在 /api/v1 下；限流中间件在最外层，
//! 请求超时由 TimeoutLayer 统一兜底（408）。

use axum::{http::StatusCode, middleware, routing::get, Router};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::rate_limit::rate_limit_middleware;
use crate::state::AppState;

mod auth_routes;
mod readme_routes;
mod template_routes;
mod user_routes;
mod widget_routes;

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes::routes())
        .merge(template_routes::routes())
        .merge(widget_routes::routes())
        .merge(readme_routes::routes())
        .merge(user_routes::routes())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

//! 挂件路由
//!
//! 目录只读：没有创建/删除接口，点赞需要登录。

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use domain::{Page, Widget};

use crate::extract::{PaginationQuery, SearchQuery};
use crate::{error::ApiError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/widgets", get(list_widgets))
        .route("/widgets/search", get(search_widgets))
        .route("/widgets/{id}", get(get_widget))
        .route("/widgets/{id}/like", post(like_widget))
        .route("/widgets/{id}/dislike", post(dislike_widget))
}

async fn list_widgets(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Page<Widget>>, ApiError> {
    Ok(Json(state.widget_service.list(query.into_pagination()).await?))
}

async fn get_widget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Widget>, ApiError> {
    Ok(Json(state.widget_service.get(id).await?))
}

async fn like_widget(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    state.widget_service.like(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn dislike_widget(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    state.widget_service.dislike(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn search_widgets(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Widget>>, ApiError> {
    Ok(Json(state.widget_service.search(&query.q).await?))
}

//! Readme 路由，全部需要登录

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use application::repository::UpdateFields;
use application::services::CreateReadmeRequest;
use domain::{Page, Readme};

use crate::extract::PaginationQuery;
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct CreateReadmePayload {
    template_id: Option<Uuid>,
    title: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    text_blocks: Vec<String>,
    #[serde(default)]
    links: Vec<String>,
    #[serde(default)]
    widgets: HashMap<String, String>,
    #[serde(default)]
    render_order: Vec<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/readmes", get(list_readmes).post(create_readme))
        .route(
            "/readmes/{id}",
            get(get_readme).patch(update_readme).delete(delete_readme),
        )
}

async fn create_readme(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CreateReadmePayload>,
) -> Result<(StatusCode, Json<Readme>), ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;

    let readme = state
        .readme_service
        .create(
            user_id,
            CreateReadmeRequest {
                template_id: payload.template_id,
                title: payload.title,
                image: payload.image,
                text_blocks: payload.text_blocks,
                links: payload.links,
                widgets: payload.widgets,
                render_order: payload.render_order,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(readme)))
}

async fn list_readmes(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Page<Readme>>, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    let page = state
        .readme_service
        .list_own(user_id, query.into_pagination())
        .await?;
    Ok(Json(page))
}

async fn get_readme(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<Json<Readme>, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    Ok(Json(state.readme_service.get(user_id, id).await?))
}

async fn update_readme(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Json(fields): Json<UpdateFields>,
) -> Result<Json<Readme>, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    Ok(Json(state.readme_service.update(user_id, id, fields).await?))
}

async fn delete_readme(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    state.readme_service.delete(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

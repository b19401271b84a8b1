//! 模板路由

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use application::repository::UpdateFields;
use application::services::CreateTemplateRequest;
use domain::{Page, Template};

use crate::extract::{PaginationQuery, SearchQuery};
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct CreateTemplatePayload {
    title: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    text_blocks: Vec<String>,
    #[serde(default)]
    links: Vec<String>,
    #[serde(default)]
    widgets: HashMap<String, String>,
    #[serde(default)]
    render_order: Vec<String>,
    #[serde(default)]
    is_public: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates).post(create_template))
        .route("/templates/search", get(search_templates))
        .route(
            "/templates/{id}",
            get(get_template)
                .patch(update_template)
                .delete(delete_template),
        )
        .route("/templates/{id}/like", post(like_template))
        .route("/templates/{id}/dislike", post(dislike_template))
}

async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Page<Template>>, ApiError> {
    let page = state
        .template_service
        .list(query.into_pagination())
        .await?;
    Ok(Json(page))
}

async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Template>, ApiError> {
    Ok(Json(state.template_service.get(id).await?))
}

async fn create_template(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<(StatusCode, Json<Template>), ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;

    let template = state
        .template_service
        .create(
            user_id,
            CreateTemplateRequest {
                title: payload.title,
                image: payload.image,
                description: payload.description,
                text_blocks: payload.text_blocks,
                links: payload.links,
                widgets: payload.widgets,
                render_order: payload.render_order,
                is_public: payload.is_public,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

async fn update_template(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Json(fields): Json<UpdateFields>,
) -> Result<Json<Template>, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    let template = state.template_service.update(user_id, id, fields).await?;
    Ok(Json(template))
}

async fn delete_template(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    state.template_service.delete(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn like_template(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    state.template_service.like(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn dislike_template(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    state.template_service.dislike(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn search_templates(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Template>>, ApiError> {
    Ok(Json(state.template_service.search(&query.q).await?))
}

//! 用户路由

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use application::repository::UpdateFields;
use domain::User;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct DeleteAccountPayload {
    password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{id}", get(get_user))
        .route("/users/me", patch(update_me).delete(delete_me))
        .route("/users/me/avatar", post(upload_avatar))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.user_service.get(id).await?))
}

async fn update_me(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(fields): Json<UpdateFields>,
) -> Result<Json<User>, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    Ok(Json(state.user_service.update_profile(user_id, fields).await?))
}

/// 删除账号需要当前密码确认
async fn delete_me(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<DeleteAccountPayload>,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    state.user_service.delete(user_id, &payload.password).await?;
    // 账号没了，会话 cookie 一并作废
    let jar = jar.add(state.jwt_service.logout_cookie());
    Ok((jar, StatusCode::NO_CONTENT))
}

async fn upload_avatar(
    State(state): State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("avatar")
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(err.to_string()))?;

        let url = state
            .user_service
            .upload_avatar(user_id, bytes.to_vec(), &filename)
            .await?;
        return Ok(Json(json!({"avatar": url})));
    }

    Err(ApiError::bad_request("missing image field"))
}

//! 注册与认证路由
//!
//! 验证流程的子状态（码错/次数耗尽/过期）用 200 + 类型化负载返回，
//! 客户端由此区分流程状态与传输失败。

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use domain::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use application::services::{LoginRequest, SendCodeRequest, VerifyRequest};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
struct VerifyPayload {
    #[validate(length(min = 3, max = 32))]
    nickname: String,
    #[validate(length(min = 3, max = 32))]
    login: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 8, max = 72))]
    password: String,
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterPayload {
    #[validate(email)]
    email: String,
    #[validate(length(equal = 6))]
    code: String,
}

#[derive(Debug, Deserialize, Validate)]
struct NewCodePayload {
    #[validate(email)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    login: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    id: Uuid,
    nickname: String,
    avatar: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/verify", post(send_code))
        .route("/auth/register", post(register))
        .route("/auth/new-code", post(new_code))
        .route("/auth/login", get(login))
        .route("/auth/logout", get(logout))
        .route("/auth/profile", get(profile))
}

async fn send_code(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::validation(err.to_string()))?;

    state
        .verification_service
        .send_code(SendCodeRequest {
            nickname: payload.nickname,
            login: payload.login,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok(Json(json!({"status": "code_sent"})))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::validation(err.to_string()))?;

    let result = state
        .verification_service
        .verify(VerifyRequest {
            email: payload.email,
            code: payload.code,
        })
        .await;

    match result {
        Ok(user) => Ok(Json(json!({
            "status": "registered",
            "id": user.id,
            "nickname": user.nickname,
        }))),
        // 流程态：200 + 类型化负载
        Err(err) if err.is_verification_flow() => Ok(Json(json!({
            "status": flow_status(&err),
            "message": err.to_string(),
        }))),
        Err(err) => Err(err.into()),
    }
}

fn flow_status(err: &DomainError) -> &'static str {
    match err {
        DomainError::InvalidCode => "invalid_code",
        DomainError::ZeroAttempts => "zero_attempts",
        DomainError::CodeExpired => "code_expired",
        _ => "error",
    }
}

async fn new_code(
    State(state): State<AppState>,
    Json(payload): Json<NewCodePayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::validation(err.to_string()))?;

    state.verification_service.resend_code(&payload.email).await?;
    Ok(Json(json!({"status": "code_sent"})))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    // 已带有效会话的登录请求冲突
    if state.jwt_service.has_valid_session(&jar) {
        return Err(ApiError::already_logged_in());
    }

    let user = state
        .auth_service
        .login(LoginRequest {
            login: payload.login,
            password: payload.password,
        })
        .await?;

    let token = state.jwt_service.mint(user.id)?;
    let jar = jar.add(state.jwt_service.login_cookie(token));

    Ok((
        jar,
        Json(LoginResponse {
            id: user.id,
            nickname: user.nickname,
            avatar: user.avatar,
        }),
    ))
}

async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar.add(state.jwt_service.logout_cookie());
    (jar, Json(json!({"status": "logged_out"})))
}

async fn profile(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<domain::User>, ApiError> {
    let user_id = state.jwt_service.user_from_jar(&jar)?;
    let user = state.user_service.get(user_id).await?;
    Ok(Json(user))
}

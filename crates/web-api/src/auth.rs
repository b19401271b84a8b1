//! JWT 认证模块
//!
//! HS256 对称签名，注册声明 sub/iat/exp/jti/iss/aud 齐全。
//! token 以 HTTP-only、SameSite=Lax 的 `jwt` cookie 投递，
//! Max-Age 与 token 有效期一致；登出用过期 cookie 覆盖。

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use config::AuthConfig;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const JWT_COOKIE: &str = "jwt";
const ISSUER: &str = "readmeow";
const AUDIENCE: &str = "readmeow-users";

/// JWT 注册声明
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub iss: String,
    pub aud: Vec<String>,
}

/// JWT 签发与校验；校验是 (cookie, secret) 的纯函数
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_ref()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_ref()),
            ttl_hours: config.jwt_ttl_hours,
        }
    }

    /// 签发 token
    pub fn mint(&self, user_id: Uuid) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(self.ttl_hours)).timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: ISSUER.to_string(),
            aud: vec![AUDIENCE.to_string()],
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| ApiError::unauthorized(format!("token generation failed: {}", err)))
    }

    /// 校验并解析 token；签名、过期、iss/aud 任一不符即拒绝
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| ApiError::unauthorized(format!("invalid token: {}", err)))
    }

    /// 从 cookie jar 取当前用户；没有或无效都是 401
    pub fn user_from_jar(&self, jar: &CookieJar) -> Result<Uuid, ApiError> {
        let cookie = jar
            .get(JWT_COOKIE)
            .ok_or_else(|| ApiError::unauthorized("missing jwt cookie"))?;
        Ok(self.verify(cookie.value())?.sub)
    }

    /// 已带有效 cookie 的登录请求应报 409
    pub fn has_valid_session(&self, jar: &CookieJar) -> bool {
        jar.get(JWT_COOKIE)
            .map(|cookie| self.verify(cookie.value()).is_ok())
            .unwrap_or(false)
    }

    /// 登录 cookie：HTTP-only，SameSite=Lax，Max-Age 等于 token 有效期
    pub fn login_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((JWT_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::hours(self.ttl_hours))
            .build()
    }

    /// 登出 cookie：空值 + 过去的过期时间
    pub fn logout_cookie(&self) -> Cookie<'static> {
        Cookie::build((JWT_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::ZERO)
            .build()
    }
}

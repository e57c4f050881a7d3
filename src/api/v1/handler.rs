use super::error::*;
use crate::application_port::SessionService;
use crate::domain_model::SessionIdentity;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// A request whose token resolved to a live session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub identity: SessionIdentity,
    pub remaining_ttl: i64,
}

#[derive(Debug, Serialize)]
struct SessionView {
    #[serde(flatten)]
    identity: SessionIdentity,
    expires_in: i64,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
    token_head: String,
}

pub async fn current_session(context: SessionContext) -> Result<impl warp::Reply, warp::Rejection> {
    let response = SessionView {
        expires_at: Utc::now() + Duration::seconds(context.remaining_ttl),
        expires_in: context.remaining_ttl,
        identity: context.identity,
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

pub async fn refresh_token(
    credential: Option<String>,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let credential = credential.unwrap_or_default();
    let token = session_service
        .refresh_head_token(&credential)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?
        .ok_or_else(|| reject::custom(ApiErrorCode::InvalidToken))?;

    let response = TokenResponse {
        token: token.0,
        token_head: session_service.config().token_head.0.clone(),
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

pub async fn issue_token(
    identity: SessionIdentity,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if identity.username.is_empty() {
        return Err(reject::custom(ApiErrorCode::BadRequest));
    }
    let token = session_service
        .generate(&identity)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = TokenResponse {
        token: token.0,
        token_head: session_service.config().token_head.0.clone(),
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

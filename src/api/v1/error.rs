use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(err.clone(), err.to_string()));
        Ok(warp::reply::with_status(json, StatusCode::OK))
    } else {
        let json = warp::reply::json(&ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiError {
                code: ApiErrorCode::InternalError,
                message: format!("Unhandled error: {:?}", err),
            }),
        });
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Operation not permitted")]
    Forbidden,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            // A missing account and a wrong password are indistinguishable at
            // the boundary, so clients cannot enumerate registered emails.
            AuthError::UserNotFound | AuthError::InvalidCredentials => {
                ApiErrorCode::InvalidCredentials
            }
            AuthError::MissingCredential
            | AuthError::MalformedCredential
            | AuthError::MalformedToken
            | AuthError::SignatureInvalid
            | AuthError::TokenExpired
            | AuthError::MalformedSubject
            | AuthError::Unauthorized => ApiErrorCode::InvalidToken,
            AuthError::Forbidden => ApiErrorCode::Forbidden,
            AuthError::Storage(e) => ApiErrorCode::internal(e),
            AuthError::Hashing(e) => ApiErrorCode::internal(e),
            AuthError::Signing(e) => ApiErrorCode::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_faults_share_one_code() {
        assert!(matches!(
            ApiErrorCode::from(AuthError::UserNotFound),
            ApiErrorCode::InvalidCredentials
        ));
        assert!(matches!(
            ApiErrorCode::from(AuthError::InvalidCredentials),
            ApiErrorCode::InvalidCredentials
        ));
    }

    #[test]
    fn dead_sessions_read_as_invalid_token() {
        assert!(matches!(
            ApiErrorCode::from(AuthError::Unauthorized),
            ApiErrorCode::InvalidToken
        ));
        assert!(matches!(
            ApiErrorCode::from(AuthError::TokenExpired),
            ApiErrorCode::InvalidToken
        ));
    }

    #[test]
    fn internal_faults_are_not_leaked() {
        assert!(matches!(
            ApiErrorCode::from(AuthError::Storage("pool gone".to_string())),
            ApiErrorCode::InternalError
        ));
        assert!(matches!(
            ApiErrorCode::from(AuthError::Hashing("entropy".to_string())),
            ApiErrorCode::InternalError
        ));
        assert!(matches!(
            ApiErrorCode::from(AuthError::Signing("bad key".to_string())),
            ApiErrorCode::InternalError
        ));
    }
}

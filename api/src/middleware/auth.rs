//! Access token authentication middleware for protecting API endpoints.
//!
//! This middleware extracts the access token from the Authorization header,
//! verifies it with the token service held in application state, and
//! injects the caller's context into the request.

use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    web, Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use warden_core::services::token::{Verification, VerifiedToken};

use crate::handlers::ApiError;
use crate::routes::AppState;

/// Caller context injected into authenticated requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject ID from the verified token
    pub subject_id: String,
    /// Subject email as currently resolved
    pub email: Option<String>,
    /// Subject roles as currently resolved
    pub roles: Vec<String>,
    /// Token ID for tracking
    pub jti: String,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
}

impl From<VerifiedToken> for AuthContext {
    fn from(verified: VerifiedToken) -> Self {
        Self {
            jti: verified.jti().to_string(),
            expires_at: verified.claims.expires_at(),
            subject_id: verified.subject.id,
            email: verified.subject.email,
            roles: verified.subject.roles,
        }
    }
}

/// Access token authentication middleware factory
#[derive(Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Access token authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = match bearer_token(req.headers()).map(str::to_string) {
                Some(token) => token,
                None => return Ok(reject(req, ApiError::Unauthorized)),
            };

            let state = match req.app_data::<web::Data<AppState>>().cloned() {
                Some(state) => state,
                None => {
                    log::error!("Token service missing from application state");
                    return Ok(reject(req, ApiError::Internal));
                }
            };

            let context = match state.token_service.authenticate(&token).await {
                Ok(Verification::Valid(verified)) => AuthContext::from(verified),
                Ok(Verification::Rejected(reason)) => {
                    log::warn!("Access token rejected: {} ({})", reason, reason.code());
                    return Ok(reject(req, ApiError::Unauthorized));
                }
                Err(error) => return Ok(reject(req, ApiError::from(error))),
            };

            req.extensions_mut().insert(context);

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Short-circuits the request with the error's response
fn reject<B>(req: ServiceRequest, error: ApiError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(error.error_response())
        .map_into_right_body()
}

/// Extracts a Bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized.into());

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_http_request();
        assert_eq!(bearer_token(req.headers()), Some("test_token_123"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "test_token_123"))
            .to_http_request();
        assert_eq!(bearer_token(req.headers()), None);

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert_eq!(bearer_token(req.headers()), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(req.headers()), None);
    }
}

use std::future::{Ready, ready};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use futures_util::future::LocalBoxFuture;

use crate::error::AppError;
use crate::utils::jwt::validate_token;

/// Bearer-token gate for the remote history. Rejects before any handler
/// (and so any database call) runs; on success the [`Claims`](crate::utils::jwt::Claims)
/// are stored in the request extensions.
pub struct JwtAuth {
    pub secret: String,
    pub sign_in_path: String,
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service,
            secret: self.secret.clone(),
            sign_in_path: self.sign_in_path.clone(),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: S,
    secret: String,
    sign_in_path: String,
}

impl<S> JwtAuthMiddleware<S> {
    fn reject(&self, reason: &str) -> Error {
        log::warn!("Rejected unauthenticated request: {}", reason);
        AppError::Unauthenticated {
            sign_in: self.sign_in_path.clone(),
        }
        .into()
    }
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let auth_header = match req.headers().get(header::AUTHORIZATION) {
            Some(header) => header,
            None => {
                let err = self.reject("no authorization header");
                return Box::pin(async move { Err(err) });
            }
        };

        let token = match auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
        {
            Some(token) => token,
            None => {
                let err = self.reject("invalid authorization format");
                return Box::pin(async move { Err(err) });
            }
        };

        let claims = match validate_token(token, &self.secret) {
            Ok(claims) => claims,
            Err(e) => {
                let err = self.reject(&e.to_string());
                return Box::pin(async move { Err(err) });
            }
        };

        // Store claims in request extensions for the handlers
        req.extensions_mut().insert(claims);

        Box::pin(self.service.call(req))
    }
}

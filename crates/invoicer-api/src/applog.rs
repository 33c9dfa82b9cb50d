use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::RequestId;

/// Request details attached to every application log record.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: String,
    pub path: String,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_else(|| "-".to_string());

        Ok(Self {
            request_id,
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
        })
    }
}

/// An audit record for a handled invoice operation, e.g. action
/// `post-invoice`, status 201, message `created invoice 4`. Failures are
/// recorded too, with the error status and message.
#[derive(Debug)]
pub struct AppLog {
    pub action: &'static str,
    pub status: StatusCode,
    pub message: String,
}

impl AppLog {
    pub fn new(action: &'static str, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            action,
            status,
            message: message.into(),
        }
    }

    pub fn emit(&self, ctx: &RequestContext) {
        if self.status.is_success() {
            info!(
                target: "invoicer::applog",
                action = self.action,
                status = self.status.as_u16(),
                request_id = %ctx.request_id,
                method = %ctx.method,
                path = %ctx.path,
                "{}",
                self.message
            );
        } else {
            warn!(
                target: "invoicer::applog",
                action = self.action,
                status = self.status.as_u16(),
                request_id = %ctx.request_id,
                method = %ctx.method,
                path = %ctx.path,
                "{}",
                self.message
            );
        }
    }
}

/// Records a failed handler result under `action` and passes it through.
pub trait Audited: Sized {
    fn audited(self, action: &'static str, ctx: &RequestContext) -> Self;
}

impl<T> Audited for Result<T, ApiError> {
    fn audited(self, action: &'static str, ctx: &RequestContext) -> Self {
        if let Err(err) = &self {
            AppLog::new(action, err.status(), err.to_string()).emit(ctx);
        }
        self
    }
}

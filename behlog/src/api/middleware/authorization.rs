use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use behlog_core::authorization::{Caller, Decision, DenyReason, Permission};
use std::future::Future;
use std::pin::Pin;

use crate::api::error::AppError;
use crate::app_state::SharedAppState;

type MiddlewareFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Middleware factory guarding a route with a single permission.
///
/// Expects the [`Caller`] extension set by [`crate::api::auth::auth`].
/// Unauthenticated callers get 401, other denials 403, and a store failure
/// 503. The handler only runs on `Granted`.
pub fn require_permission(
    permission: Permission,
) -> impl Fn(State<SharedAppState>, Extension<Caller>, Request, Next) -> MiddlewareFuture + Clone {
    move |State(state): State<SharedAppState>,
          Extension(caller): Extension<Caller>,
          req: Request,
          next: Next| {
        Box::pin(async move {
            match state.gate.authorize(&caller, permission).await {
                Ok(Decision::Granted) => next.run(req).await,
                Ok(Decision::Denied(DenyReason::Unauthenticated)) => {
                    AppError::Unauthenticated.into_response()
                }
                Ok(Decision::Denied(_)) => {
                    AppError::Forbidden(permission.to_string()).into_response()
                }
                Err(e) => AppError::from(e).into_response(),
            }
        })
    }
}

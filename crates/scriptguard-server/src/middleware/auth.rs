//! Bearer-token authentication.
//!
//! Resolves `Authorization: Bearer <token>` to a user id and stores a
//! [`CallerIdentity`] in the request extensions. Requests without a valid
//! token pass through untouched; handlers decide whether a caller is
//! required.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use scriptguard_core::traits::IIdentityResolver;
use scriptguard_core::{CallerIdentity, IScriptGuardStorage};
use tracing::{debug, warn};

pub struct AuthMiddleware {
    identities: Arc<dyn IScriptGuardStorage>,
}

impl AuthMiddleware {
    pub fn new(identities: Arc<dyn IScriptGuardStorage>) -> Self {
        Self { identities }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            identities: Arc::clone(&self.identities),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    identities: Arc<dyn IScriptGuardStorage>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let identities = Arc::clone(&self.identities);

        Box::pin(async move {
            if let Some(token) = bearer_token(&req) {
                if let Some(user_id) = resolve(identities, token).await {
                    req.extensions_mut().insert(CallerIdentity::new(user_id));
                }
            }
            service.call(req).await
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

async fn resolve(identities: Arc<dyn IScriptGuardStorage>, token: String) -> Option<String> {
    match web::block(move || identities.resolve_bearer(&token)).await {
        Ok(Ok(Some(user_id))) => Some(user_id),
        Ok(Ok(None)) => {
            debug!("bearer token did not resolve to a user");
            None
        }
        Ok(Err(e)) => {
            warn!(error = %e, "bearer token lookup failed");
            None
        }
        Err(e) => {
            warn!(error = %e, "bearer token lookup was cancelled");
            None
        }
    }
}

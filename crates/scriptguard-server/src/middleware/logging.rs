//! Access log: one event per request with status, latency and caller.

use std::rc::Rc;
use std::time::Instant;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use scriptguard_core::CallerIdentity;
use tracing::{error, info, warn};

pub struct LoggingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = LoggingMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(LoggingMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct LoggingMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggingMiddlewareService<S>
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
        let method = req.method().to_string();
        let path = req.path().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let result = service.call(req).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(res) => {
                    let status = res.status().as_u16();
                    // Set by the auth layer, which runs inside this one.
                    let user_id = res
                        .request()
                        .extensions()
                        .get::<CallerIdentity>()
                        .map(|c| c.user_id.clone())
                        .unwrap_or_default();
                    if status >= 500 {
                        error!(%method, %path, status, duration_ms, %user_id, "request failed");
                    } else if status >= 400 {
                        warn!(%method, %path, status, duration_ms, %user_id, "request rejected");
                    } else {
                        info!(%method, %path, status, duration_ms, %user_id, "request completed");
                    }
                }
                Err(e) => {
                    warn!(%method, %path, error = %e, duration_ms, "request errored");
                }
            }

            result
        })
    }
}

//! # scriptguard-server
//!
//! actix-web surface over the ScriptGuard orchestrator. Routes live in
//! [`handlers`], bearer resolution and CORS in [`middleware`], and the
//! error-to-status mapping in [`errors`].

pub mod errors;
pub mod handlers;
pub mod middleware;

use std::path::Path;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpResponse};
use scriptguard_core::config::{StorageBackend, StorageConfig};
use scriptguard_core::traits::{InMemoryObjectStorage, InMemoryStorage};
use scriptguard_core::{IObjectStorage, IScriptGuardStorage, Orchestrator, StorageError};
use scriptguard_storage::{FsObjectStorage, StorageEngine};
use serde_json::json;
use tracing::{info, warn};

use errors::ApiError;
use middleware::{AuthMiddleware, CorsMiddleware, LoggingMiddleware};

/// Shared per-process state handed to every handler.
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    max_body_bytes: usize,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, max_body_bytes: usize) -> Self {
        Self {
            orchestrator,
            max_body_bytes,
        }
    }

    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        Arc::clone(&self.orchestrator)
    }
}

/// Register every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    handlers::operations::configure(cfg);
    handlers::keys::configure(cfg);
    handlers::account::configure(cfg);
}

/// The full application: routes, extractor config and middleware.
///
/// Middleware order, outermost first: logging, CORS, auth. Preflight
/// requests are therefore answered before any token lookup.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let identities = Arc::clone(state.orchestrator.storage());
    let json_config = web::JsonConfig::default()
        .limit(state.max_body_bytes)
        .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into());

    App::new()
        .app_data(state)
        .app_data(json_config)
        .app_data(query_config)
        .configure(configure)
        .default_service(web::route().to(not_found))
        .wrap(AuthMiddleware::new(identities))
        .wrap(CorsMiddleware)
        .wrap(LoggingMiddleware)
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "Not found" }))
}

/// Row store and object store for the configured backend.
pub fn build_backend(
    config: &StorageConfig,
) -> Result<(Arc<dyn IScriptGuardStorage>, Arc<dyn IObjectStorage>), StorageError> {
    match config.backend {
        StorageBackend::Sqlite => {
            let engine = StorageEngine::open(Path::new(&config.database_path))?;
            let objects = FsObjectStorage::open(&config.object_root)?;
            info!(
                database = %config.database_path,
                objects = %config.object_root,
                "sqlite backend ready"
            );
            Ok((Arc::new(engine), Arc::new(objects)))
        }
        StorageBackend::Memory => {
            warn!("memory backend selected; nothing survives a restart");
            Ok((
                Arc::new(InMemoryStorage::new()),
                Arc::new(InMemoryObjectStorage::new()),
            ))
        }
    }
}

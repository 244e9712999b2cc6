//! ScriptGuard HTTP server.
//!
//! Configuration comes from the TOML file named by `SCRIPTGUARD_CONFIG`,
//! defaults otherwise.

use std::sync::Arc;

use actix_web::{web, HttpServer};
use scriptguard_core::tracing::init_tracing;
use scriptguard_core::{Orchestrator, ScriptGuardConfig};
use scriptguard_server::{build_app, build_backend, AppState};
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = ScriptGuardConfig::load_from_env()?;
    init_tracing(&config.observability);

    let (storage, objects) = build_backend(&config.storage)?;
    let orchestrator = Arc::new(Orchestrator::new(storage, objects));
    let state = web::Data::new(AppState::new(orchestrator, config.server.max_body_bytes));

    let bind_target = config.server.bind_target();
    let mut server = HttpServer::new(move || build_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    info!(bind = %bind_target, "scriptguard listening");
    server.bind(&bind_target)?.run().await?;
    Ok(())
}

//! License key management.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use scriptguard_core::orchestrator::{CreateKeyRequest, UpdateKeyStatusRequest};
use scriptguard_core::CallerIdentity;
use serde::Serialize;

use super::{caller, run_blocking};
use crate::errors::ApiResult;
use crate::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/keys")
            .service(list_keys)
            .service(create_key)
            .service(update_status)
            .service(revoke_key)
            .service(delete_key),
    );
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
}

#[get("")]
async fn list_keys(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let keys = run_blocking(move || orchestrator.list_keys(caller.as_ref())).await?;
    Ok(HttpResponse::Ok().json(keys))
}

#[post("")]
async fn create_key(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
    body: web::Json<CreateKeyRequest>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let key =
        run_blocking(move || orchestrator.create_key(caller.as_ref(), body.into_inner())).await?;
    Ok(HttpResponse::Created().json(key))
}

/// Toggle between `active` and `inactive`.
#[patch("/{id}/status")]
async fn update_status(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
    path: web::Path<String>,
    body: web::Json<UpdateKeyStatusRequest>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let key_id = path.into_inner();
    let key = run_blocking(move || {
        orchestrator.set_key_status(caller.as_ref(), &key_id, body.into_inner())
    })
    .await?;
    Ok(HttpResponse::Ok().json(key))
}

#[post("/{id}/revoke")]
async fn revoke_key(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let key_id = path.into_inner();
    let key = run_blocking(move || orchestrator.revoke_key(caller.as_ref(), &key_id)).await?;
    Ok(HttpResponse::Ok().json(key))
}

#[delete("/{id}")]
async fn delete_key(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let key_id = path.into_inner();
    run_blocking(move || orchestrator.delete_key(caller.as_ref(), &key_id)).await?;
    Ok(HttpResponse::Ok().json(Deleted { success: true }))
}

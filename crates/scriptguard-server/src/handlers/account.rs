//! Profiles, activity history, dashboard and listings.

use actix_web::{get, patch, post, web, HttpResponse};
use scriptguard_core::orchestrator::{ProvisionRequest, RenameRequest};
use scriptguard_core::CallerIdentity;
use serde::Deserialize;

use super::{caller, run_blocking};
use crate::errors::ApiResult;
use crate::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(provision_profile)
        .service(get_profile)
        .service(rename_profile)
        .service(history)
        .service(dashboard)
        .service(encryptions)
        .service(analyses)
        .service(plans);
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

/// Sign-up. Unauthenticated; the response carries the new bearer token.
#[post("/api/profiles")]
async fn provision_profile(
    state: web::Data<AppState>,
    body: web::Json<ProvisionRequest>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let outcome = run_blocking(move || orchestrator.provision_profile(body.into_inner())).await?;
    Ok(HttpResponse::Created().json(outcome))
}

#[get("/api/profile")]
async fn get_profile(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let profile = run_blocking(move || orchestrator.get_profile(caller.as_ref())).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[patch("/api/profile/name")]
async fn rename_profile(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
    body: web::Json<RenameRequest>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let profile =
        run_blocking(move || orchestrator.rename_profile(caller.as_ref(), body.into_inner()))
            .await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[get("/api/history")]
async fn history(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
    query: web::Query<HistoryQuery>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let limit = query.limit;
    let entries =
        run_blocking(move || orchestrator.recent_activity(caller.as_ref(), limit)).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[get("/api/dashboard")]
async fn dashboard(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let stats = run_blocking(move || orchestrator.dashboard(caller.as_ref())).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/api/encryptions")]
async fn encryptions(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let records = run_blocking(move || orchestrator.list_encryptions(caller.as_ref())).await?;
    Ok(HttpResponse::Ok().json(records))
}

#[get("/api/analyses")]
async fn analyses(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let records = run_blocking(move || orchestrator.list_analyses(caller.as_ref())).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Public plan catalog.
#[get("/api/plans")]
async fn plans(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.orchestrator().plan_catalog())
}

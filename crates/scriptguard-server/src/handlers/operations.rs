//! Encrypt and analyze endpoints.

use actix_web::{post, web, HttpResponse};
use scriptguard_core::orchestrator::{AnalyzeRequest, EncryptRequest};
use scriptguard_core::CallerIdentity;

use super::{caller, run_blocking};
use crate::errors::ApiResult;
use crate::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(encrypt_script).service(analyze_script);
}

/// Protect a script and return its loader.
#[post("/api/encrypt-script")]
async fn encrypt_script(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
    body: web::Json<EncryptRequest>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let outcome =
        run_blocking(move || orchestrator.encrypt(caller.as_ref(), body.into_inner())).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Produce a findings report for a script.
#[post("/api/analyze-script")]
async fn analyze_script(
    state: web::Data<AppState>,
    identity: Option<web::ReqData<CallerIdentity>>,
    body: web::Json<AnalyzeRequest>,
) -> ApiResult<HttpResponse> {
    let orchestrator = state.orchestrator();
    let caller = caller(identity);
    let outcome =
        run_blocking(move || orchestrator.analyze(caller.as_ref(), body.into_inner())).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

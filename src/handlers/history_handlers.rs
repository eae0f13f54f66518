use actix_web::{HttpMessage, HttpRequest, HttpResponse, Result, web};
use validator::Validate;

use crate::error::AppError;
use crate::services::history::HistoryStore;
use crate::state::app_state::AppState;
use crate::structs::qr_request::{SaveCodeRequest, SaveHistoryRequest};
use crate::utils::jwt::Claims;

/// Save the session's current code into the local bounded history
pub async fn save_local(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<SaveHistoryRequest>>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let req = body.map(|b| b.into_inner()).unwrap_or_default();
    req.validate()?;

    let entry = app_state.with_session(&id, |session| Ok(session.history_entry(req.name)))?;
    let item = app_state.local_history.save(entry).await?;

    Ok(HttpResponse::Created().json(item))
}

pub async fn list_local(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let items = app_state.local_history.list().await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn delete_local(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    app_state.local_history.delete(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn clear_local(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    app_state.local_history.clear().await?;
    log::info!("Cleared local history");
    Ok(HttpResponse::NoContent().finish())
}

// Set by JwtAuth for every request under /api/codes
fn current_owner(req: &HttpRequest) -> Result<String, AppError> {
    req.extensions()
        .get::<Claims>()
        .map(|claims| claims.sub.clone())
        .ok_or_else(|| AppError::Internal("User claims not found in request".to_string()))
}

/// Save a session's current code to the caller's remote history.
/// Nothing is recorded locally unless the insert succeeds.
pub async fn save_remote(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(body): web::Json<SaveCodeRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let owner = current_owner(&req)?;
    let store = app_state.remote_history(&owner)?;

    let entry = app_state.with_session(&body.session_id, |session| {
        Ok(session.history_entry(body.name.clone()))
    })?;
    let item = store.save(entry).await.inspect_err(|e| {
        log::error!("Failed to save QR code for {}: {}", owner, e);
    })?;

    Ok(HttpResponse::Created().json(item))
}

pub async fn list_remote(
    app_state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let owner = current_owner(&req)?;
    let items = app_state
        .remote_history(&owner)?
        .list()
        .await
        .inspect_err(|e| log::error!("Failed to load QR codes for {}: {}", owner, e))?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn delete_remote(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let owner = current_owner(&req)?;
    let code_id = path.into_inner();
    app_state
        .remote_history(&owner)?
        .delete(&code_id)
        .await
        .inspect_err(|e| log::error!("Failed to delete QR code {}: {}", code_id, e))?;
    Ok(HttpResponse::NoContent().finish())
}

use actix_web::{HttpResponse, Result, web};
use nanoid::nanoid;

use crate::error::AppError;
use crate::services::logo::Logo;
use crate::services::payload;
use crate::services::session::EditorSession;
use crate::state::app_state::AppState;
use crate::structs::qr_request::{
    CreateSessionRequest, PayloadResponse, QrRequest, SwitchSchemeRequest,
};
use crate::structs::render_config::ConfigUpdate;
use crate::structs::session::SessionResponse;

/// Build the payload for a request without touching any session
pub async fn build_payload(web::Json(req): web::Json<QrRequest>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(PayloadResponse {
        scheme: req.scheme(),
        payload: payload::build(&req),
    }))
}

/// Start a new editing session
pub async fn create_session(
    app_state: web::Data<AppState>,
    body: Option<web::Json<CreateSessionRequest>>,
) -> Result<HttpResponse, AppError> {
    let mut session = EditorSession::new();
    if let Some(request) = body.and_then(|b| b.into_inner().request) {
        session.apply_request(request);
    }

    let id = nanoid!(12);
    let response = SessionResponse::new(&id, &session);
    app_state.insert_session(id.clone(), session)?;
    log::info!("Created editing session {}", id);

    Ok(HttpResponse::Created().json(response))
}

pub async fn get_session(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let response = app_state.with_session(&id, |session| Ok(SessionResponse::new(&id, session)))?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn delete_session(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    app_state
        .remove_session(&id)?
        .ok_or(AppError::SessionNotFound)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Replace one scheme's fields and make it the active scheme
pub async fn update_request(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    web::Json(req): web::Json<QrRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let response = app_state.with_session(&id, |session| {
        session.apply_request(req);
        Ok(SessionResponse::new(&id, session))
    })?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn switch_scheme(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    web::Json(req): web::Json<SwitchSchemeRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let response = app_state.with_session(&id, |session| {
        session.switch_scheme(req.scheme);
        Ok(SessionResponse::new(&id, session))
    })?;
    Ok(HttpResponse::Ok().json(response))
}

/// Quick action: empty the active scheme's fields
pub async fn clear_request(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let response = app_state.with_session(&id, |session| {
        session.clear_active();
        Ok(SessionResponse::new(&id, session))
    })?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn update_config(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    web::Json(update): web::Json<ConfigUpdate>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let response = app_state.with_session(&id, |session| {
        session.update_config(update).inspect_err(|e| {
            log::warn!("Rejected config update for session {}: {}", id, e);
        })?;
        Ok(SessionResponse::new(&id, session))
    })?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn reset_config(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let response = app_state.with_session(&id, |session| {
        session.reset_config();
        Ok(SessionResponse::new(&id, session))
    })?;
    Ok(HttpResponse::Ok().json(response))
}

/// Upload a logo as the raw request body
pub async fn upload_logo(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    // Decode before taking the session lock; the body is already fully read here
    let settings = &app_state.settings;
    let logo = Logo::from_bytes(&body, settings.max_logo_bytes, settings.max_logo_dimension)
        .inspect_err(|e| {
            log::warn!("Rejected logo for session {}: {}", id, e);
        })?;

    let response = app_state.with_session(&id, |session| {
        session.set_logo(logo);
        Ok(SessionResponse::new(&id, session))
    })?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn remove_logo(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let response = app_state.with_session(&id, |session| {
        session.clear_logo();
        Ok(SessionResponse::new(&id, session))
    })?;
    Ok(HttpResponse::Ok().json(response))
}

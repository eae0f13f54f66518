use actix_web::{HttpResponse, Result, http::header, web};

use crate::error::AppError;
use crate::services::export::{export_png, export_svg};
use crate::state::app_state::AppState;

/// Download the rendered symbol exactly as shown
pub async fn download_svg(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let svg = app_state.with_session(&id, |session| export_svg(session.symbol()))?;

    Ok(HttpResponse::Ok()
        .content_type("image/svg+xml")
        .insert_header((header::CONTENT_DISPOSITION, "attachment; filename=\"qrcode.svg\""))
        .body(svg))
}

/// Download the rendered symbol as a 1024x1024 PNG
pub async fn download_png(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let symbol = app_state.with_session(&id, |session| Ok(session.symbol().cloned()))?;

    // Rasterizing takes a while; keep it off the worker thread
    let png = web::block(move || export_png(symbol.as_ref()))
        .await
        .map_err(|e| AppError::Internal(format!("PNG export failed: {}", e)))??;

    log::info!("Exported PNG for session {} ({} bytes)", id, png.len());
    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .insert_header((header::CONTENT_DISPOSITION, "attachment; filename=\"qrcode.png\""))
        .body(png))
}

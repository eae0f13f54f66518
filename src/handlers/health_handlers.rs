use actix_web::{HttpResponse, web};
use mongodb::bson::doc;

use crate::state::app_state::AppState;

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let Some(db) = &state.db else {
        return HttpResponse::Ok().json(serde_json::json!({ "success": true, "remote": "disabled" }));
    };

    // Perform a simple ping operation to check the database connection
    match db.run_command(doc! { "ping": 1 }).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "success": true, "remote": "ok" })),
        Err(e) => {
            log::error!("Health check ping failed: {}", e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "success": false, "error": "Database connection failed" }))
        }
    }
}

use actix_web::web;

use crate::config::Settings;
use crate::handlers::export_handlers::{download_png, download_svg};
use crate::handlers::health_handlers::health_check;
use crate::handlers::history_handlers::{
    clear_local, delete_local, delete_remote, list_local, list_remote, save_local, save_remote,
};
use crate::handlers::session_handlers::{
    build_payload, clear_request, create_session, delete_session, get_session, remove_logo,
    reset_config, switch_scheme, update_config, update_request, upload_logo,
};
use crate::middlewares::authmw::JwtAuth;

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig, settings: &Settings) {
    // Remote history - requires a bearer token
    cfg.service(
        web::scope("/api/codes")
            .wrap(JwtAuth {
                secret: settings.jwt_secret.clone(),
                sign_in_path: settings.sign_in_path.clone(),
            })
            .route("", web::get().to(list_remote))
            .route("", web::post().to(save_remote))
            .route("/{code_id}", web::delete().to(delete_remote)),
    );
    cfg.service(
        web::scope("/api")
            .route("/health/check", web::get().to(health_check))
            .route("/payload", web::post().to(build_payload))
            // Editing sessions
            .route("/sessions", web::post().to(create_session))
            .service(
                web::scope("/sessions/{id}")
                    .route("", web::get().to(get_session))
                    .route("", web::delete().to(delete_session))
                    .route("/request", web::put().to(update_request))
                    .route("/scheme", web::put().to(switch_scheme))
                    .route("/clear", web::post().to(clear_request))
                    .route("/config", web::put().to(update_config))
                    .route("/config/reset", web::post().to(reset_config))
                    .route("/logo", web::put().to(upload_logo))
                    .route("/logo", web::delete().to(remove_logo))
                    .route("/export.svg", web::get().to(download_svg))
                    .route("/export.png", web::get().to(download_png))
                    .route("/history", web::post().to(save_local)),
            )
            // Local bounded history
            .route("/history", web::get().to(list_local))
            .route("/history", web::delete().to(clear_local))
            .route("/history/{item_id}", web::delete().to(delete_local)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use std::sync::Arc;

    use crate::db::kv_store::MemoryStore;
    use crate::services::history::LocalHistory;
    use crate::services::logo::sample_png;
    use crate::state::app_state::AppState;
    use crate::utils::jwt::create_token;

    fn test_state() -> web::Data<AppState> {
        let settings = Settings::for_tests();
        let local = LocalHistory::new(Arc::new(MemoryStore::new()), settings.history_capacity);
        web::Data::new(AppState::new(settings, None, local))
    }

    macro_rules! test_app {
        ($state:expr) => {{
            let state = $state.clone();
            let settings = state.settings.clone();
            test::init_service(
                App::new()
                    .app_data(state)
                    .configure(|cfg| init_routes(cfg, &settings)),
            )
            .await
        }};
    }

    macro_rules! new_session {
        ($app:expr) => {{
            let req = test::TestRequest::post().uri("/api/sessions").to_request();
            let body: serde_json::Value = test::call_and_read_body_json($app, req).await;
            body["id"].as_str().unwrap().to_string()
        }};
    }

    #[actix_web::test]
    async fn payload_endpoint_builds_wifi() {
        let state = test_state();
        let app = test_app!(state);
        let req = test::TestRequest::post()
            .uri("/api/payload")
            .set_json(serde_json::json!({
                "type": "wifi", "ssid": "Home", "password": "secret", "encryption": "WPA"
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["payload"], "WIFI:S:Home;T:WPA;P:secret;;");
        assert_eq!(body["type"], "wifi");
    }

    #[actix_web::test]
    async fn session_edit_and_export_flow() {
        let state = test_state();
        let app = test_app!(state);
        let id = new_session!(&app);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/request", id))
            .set_json(serde_json::json!({ "type": "sms", "phone": "+15551234567", "message": "hi" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["payload"], "SMSTO:+15551234567:hi");
        assert_eq!(body["config"]["reliability"], "Maximum");
        let svg = body["svg"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/export.svg", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/svg+xml"
        );
        let exported = test::read_body(resp).await;
        assert_eq!(exported, svg.as_bytes());

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/export.png", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let png = test::read_body(resp).await;
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1024, 1024));
    }

    #[actix_web::test]
    async fn export_without_symbol_reports_nothing_to_export() {
        let state = test_state();
        let app = test_app!(state);
        let id = new_session!(&app);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/request", id))
            .set_json(serde_json::json!({ "type": "text", "value": "x".repeat(5000) }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["svg"].is_null());
        assert!(body["render_error"].is_string());

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/export.svg", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn bad_color_is_rejected_and_reset_restores_defaults() {
        let state = test_state();
        let app = test_app!(state);
        let id = new_session!(&app);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/config", id))
            .set_json(serde_json::json!({ "foreground": "#zzzzzz" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/config", id))
            .set_json(serde_json::json!({ "foreground": "#FF0000", "level": "L" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["config"]["foreground"], "#FF0000");
        assert_eq!(body["config"]["reliability"], "Standard");

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/config/reset", id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["config"]["foreground"], "#000000");
        assert_eq!(body["config"]["background"], "#FFFFFF");
        assert_eq!(body["config"]["level"], "H");
        assert!(body["config"]["logo"].is_null());
    }

    #[actix_web::test]
    async fn logo_upload_accepts_images_only() {
        let state = test_state();
        let app = test_app!(state);
        let id = new_session!(&app);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/logo", id))
            .set_payload("plain text")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/logo", id))
            .set_payload(sample_png(8, 8))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["config"]["logo"].as_str().unwrap().starts_with("data:image/png;base64,"));
        assert!(body["svg"].as_str().unwrap().contains("<image"));

        let req = test::TestRequest::delete()
            .uri(&format!("/api/sessions/{}/logo", id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["config"]["logo"].is_null());
    }

    #[actix_web::test]
    async fn logo_larger_than_pixel_limit_is_rejected() {
        let mut settings = Settings::for_tests();
        settings.max_logo_dimension = 64;
        let local = LocalHistory::new(Arc::new(MemoryStore::new()), settings.history_capacity);
        let state = web::Data::new(AppState::new(settings, None, local));
        let app = test_app!(state);
        let id = new_session!(&app);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/logo", id))
            .set_payload(sample_png(65, 8))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("65x8"));

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}", id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["config"]["logo"].is_null());
    }

    #[actix_web::test]
    async fn session_limit_evicts_oldest_session() {
        let mut settings = Settings::for_tests();
        settings.max_sessions = 1;
        let local = LocalHistory::new(Arc::new(MemoryStore::new()), settings.history_capacity);
        let state = web::Data::new(AppState::new(settings, None, local));
        let app = test_app!(state);
        let first = new_session!(&app);
        let second = new_session!(&app);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}", first))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}", second))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.session_count().unwrap(), 1);
    }

    #[actix_web::test]
    async fn local_history_save_list_delete() {
        let state = test_state();
        let app = test_app!(state);
        let id = new_session!(&app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/history", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let saved: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(saved["type"], "url");

        let req = test::TestRequest::get().uri("/api/history").to_request();
        let items: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(items.as_array().unwrap().len(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/history/{}", saved["id"].as_str().unwrap()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/api/history").to_request();
        let items: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(items.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn unknown_session_is_not_found() {
        let state = test_state();
        let app = test_app!(state);
        let req = test::TestRequest::get().uri("/api/sessions/missing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn remote_save_without_token_points_to_sign_in() {
        let state = test_state();
        let app = test_app!(state);
        let id = new_session!(&app);

        let req = test::TestRequest::post()
            .uri("/api/codes")
            .set_json(serde_json::json!({ "session_id": id }))
            .to_request();
        let resp = test::try_call_service(&app, req).await;
        let err = resp.err().expect("request should be rejected");
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["sign_in"], "/login");
    }

    #[actix_web::test]
    async fn remote_history_without_database_is_unavailable() {
        let state = test_state();
        let app = test_app!(state);
        let token = create_token("owner-1", None, &state.settings.jwt_secret).unwrap();

        let req = test::TestRequest::get()
            .uri("/api/codes")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use anyhow::Context;
use dotenv::dotenv;
use env_logger::Env;
use quickqr::config::Settings;
use quickqr::db::kv_store::FileStore;
use quickqr::db::mongodb::get_database;
use quickqr::routes::init_routes;
use quickqr::services::history::LocalHistory;
use quickqr::state::app_state::AppState;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::from_env()?;

    // The remote history is optional; without it only the local history is served
    let db = match &settings.mongodb_uri {
        Some(uri) => Some(get_database(uri, &settings.mongodb_database).await?),
        None => {
            log::warn!("MONGODB_URI not set, remote history disabled");
            None
        }
    };

    let store = FileStore::new(&settings.data_dir)
        .with_context(|| format!("Cannot use data directory {}", settings.data_dir.display()))?;
    let local_history = LocalHistory::new(Arc::new(store), settings.history_capacity);
    log::info!(
        "Local history in {} (capacity {})",
        settings.data_dir.display(),
        local_history.capacity()
    );

    let bind = (settings.bind_address.clone(), settings.port);
    // Bodies slightly over the logo cap still reach the handler, which reports the size
    let payload_limit = settings.max_logo_bytes + 1024;

    // Create shared state
    let app_state = web::Data::new(AppState::new(settings, db, local_history));

    log::info!("Listening on {}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        let settings = &app_state.settings;
        // Create a logger with a custom format instead
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        let cors = settings
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .expose_headers(vec![http::header::CONTENT_DISPOSITION])
            .max_age(3600);
        let routes_settings = settings.clone();
        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            .configure(move |cfg| init_routes(cfg, &routes_settings))
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

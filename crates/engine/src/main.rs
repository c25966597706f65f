//! Bookrec Service - book recommendations over a precomputed snapshot.
//!
//! The snapshot loads fully before the server binds: a missing or corrupt
//! artifact aborts startup instead of serving partial data.

use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use tracing::info;

use bookrec_core::snapshot::{self, Snapshot};
use bookrec_engine::{server, EngineConfig, RecommendationEngine};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    let config = Arc::new(EngineConfig::load()?);
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    info!(dir = %config.snapshot.dir.display(), "loading snapshot");
    let loaded = Arc::new(Snapshot::load(&config.snapshot.dir)?);
    let top_books = Arc::new(snapshot::load_top_books(&config.snapshot.dir)?);
    let engine = Arc::new(RecommendationEngine::new(loaded));
    info!(
        books = engine.snapshot().books.len(),
        merged_rows = engine.snapshot().merged.len(),
        pivot_titles = engine.snapshot().pivot.titles.len(),
        "snapshot resident"
    );

    let app_state = web::Data::new(server::AppState {
        config: config.clone(),
        engine,
        top_books,
    });

    info!("Bookrec Service listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/health", web::get().to(health_check))
            .route("/ready", web::get().to(readiness_check))
            .configure(server::configure_routes)
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(config.server.workers.unwrap_or_else(num_cpus::get))
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "bookrec-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ready"
    }))
}

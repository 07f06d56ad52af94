//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It wires the lookup service into the routes and starts actix-web.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use std::time::Duration;
use tracing::info;

use crate::api::middleware::AccessLog;
use crate::api::services::location_routes;
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// actix worker 数量上限
const MAX_WORKERS: usize = 32;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: StaticConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let lookup_service = startup.lookup_service.clone();
    let workers = config.server.workers.clamp(1, MAX_WORKERS);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    info!("Using {} worker threads", workers);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(AccessLog)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .app_data(web::Data::new(lookup_service.clone()))
            .service(location_routes())
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(workers)
    .bind(&bind_address)?
    .run();

    info!("Geolocator started at http://{}", bind_address);

    server.await?;

    info!("Server stopped");
    Ok(())
}

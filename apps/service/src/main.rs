mod config;
mod database;
mod error;
mod monitoring;
mod pool;
mod routes;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use logger::init_tracing;
use tokio::sync::broadcast;
use tracing::info;

use crate::config::Config;
use crate::database::{TargetRepository, TargetStore};
use crate::error::AppError;
use crate::monitoring::{HttpChecker, Prober, Scheduler, StatusCache};
use crate::pool::{LibsqlManager, LibsqlPool};
use crate::routes::AppState;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    init_tracing();

    let config = Config::load(env::var("BEACON_CONFIG").ok())?;
    info!(
        port = config.server.port,
        database = %config.database.path,
        interval_seconds = config.monitor.check_interval_seconds,
        "starting beacon"
    );

    let db = libsql::Builder::new_local(&config.database.path).build().await?;
    let pool: LibsqlPool = LibsqlPool::builder(LibsqlManager::new(db)).build()?;

    {
        let conn = pool.get().await?;
        database::initialize_database(&conn).await.map_err(AppError::Migration)?;
    }

    let store: Arc<dyn TargetStore> = Arc::new(TargetRepository::new(pool));
    let cache = StatusCache::new();

    let checker =
        Arc::new(HttpChecker::new(Duration::from_secs(config.monitor.probe_timeout_seconds))?);
    let prober = Prober::new(checker, cache.clone(), config.monitor.max_concurrent_probes);
    let scheduler = Scheduler::new(
        Arc::clone(&store),
        prober,
        Duration::from_secs(config.monitor.check_interval_seconds),
    );

    // One cache instance is shared between the checker and the HTTP layer;
    // the scheduler owns its half until shutdown.
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    let state = AppState { cache, store };
    HttpServer::new(move || {
        App::new().app_data(web::Data::new(state.clone())).configure(routes::routes)
    })
    .bind(("0.0.0.0", config.server.port))?
    .run()
    .await?;

    // The server has handled the termination signal; stop initiating new
    // check cycles and let any in-flight probes drain.
    info!("http server stopped, draining checker");
    let _ = shutdown_tx.send(());
    let _ = scheduler_handle.await;

    Ok(())
}

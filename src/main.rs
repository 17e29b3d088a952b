use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;

use ara_template_service::config::Settings;
use ara_template_service::postgres::PostgresPool;
use ara_template_service::redis::{CircuitBreaker, RedisPool};
use ara_template_service::server::{create_app, AppState};
use ara_template_service::sheet::TemplateTable;
use ara_template_service::store::{create_template_backend, TemplateCache, TemplateRepository};
use ara_template_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;

    // Initialize tracing; keep the guard alive until exit
    let _telemetry = init_telemetry(&settings.logging, &settings.otel)?;
    tracing::info!(backend = %settings.store.backend, "Configuration loaded");

    // Connect only the pool the chosen backend needs
    let redis_pool = match settings.store.backend.as_str() {
        "redis" => Some(Arc::new(RedisPool::new(
            settings.redis.clone(),
            Arc::new(CircuitBreaker::new()),
        )?)),
        _ => None,
    };

    let postgres_pool = match settings.store.backend.as_str() {
        "postgres" => Some(Arc::new(
            PostgresPool::new(&settings.database, Arc::new(CircuitBreaker::new()))
                .await
                .context("Failed to connect to PostgreSQL")?,
        )),
        _ => None,
    };

    let backend =
        create_template_backend(&settings.store, redis_pool, postgres_pool.clone()).await?;
    if let Err(e) = backend.health_check().await {
        tracing::warn!(
            backend = backend.backend_type(),
            error = %e,
            "Template store not reachable yet"
        );
    }

    let repository = Arc::new(TemplateRepository::new(
        backend,
        TemplateCache::from_config(&settings.cache),
        settings.render.strict,
    ));

    // Seed templates that are not stored yet
    if let Some(path) = &settings.store.seed_file {
        let table = TemplateTable::load_rows_file(path)
            .with_context(|| format!("Failed to read seed file {}", path))?;
        let added = repository.seed(table).await?;
        tracing::info!(seed_file = %path, added, "Seed templates loaded");
    }

    let addr = settings.server_addr();
    let state = AppState::new(settings, repository);
    let app = create_app(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler())
        .await?;

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}

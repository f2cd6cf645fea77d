use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use prometheus::Registry;
use relation_service::cache::{LocalRelationshipCache, RedisRelationshipCache, RelationshipCache};
use relation_service::config::Config;
use relation_service::rest_api::{self, RelationApiState};
use relation_service::{metrics, PostgresEdgeStore, RelationService, RelationshipStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "relation_service=info,actix_web=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_cache(config: &Config) -> Arc<dyn RelationshipCache> {
    let local = || -> Arc<dyn RelationshipCache> {
        Arc::new(LocalRelationshipCache::new(
            config.relation.local_cache_max_entries,
        ))
    };

    if !config.redis.enabled {
        info!("Redis disabled by configuration - using in-process cache");
        return local();
    }

    match RedisRelationshipCache::connect(&config.redis.url).await {
        Ok(cache) => {
            info!("✅ Connected to Redis for caching");
            Arc::new(cache)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Redis - using in-process cache");
            local()
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(config.app.json_logs);
    info!(
        "🔧 Starting relation-service: env={}, http_port={}, cache_ttl={}s",
        config.app.env, config.app.http_port, config.relation.cache_ttl_secs
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    sqlx::query("SELECT 1")
        .execute(&pg_pool)
        .await
        .context("Failed to verify database connection")?;
    info!("✅ Database pool created and verified");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pg_pool)
            .await
            .context("Failed to run database migrations")?;
        info!("✅ Database migrations completed");
    }

    let cache = build_cache(&config).await;
    let edges = Arc::new(PostgresEdgeStore::new(pg_pool.clone()));
    let store = Arc::new(
        RelationshipStore::new(edges, cache).with_cache_ttl(config.relation.cache_ttl()),
    );
    let service = RelationService::new(store);
    let state = RelationApiState::new(service, config.relation.request_timeout());

    let registry = Registry::new();
    metrics::register(&registry).context("Failed to register metrics")?;

    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!("🚀 Starting HTTP server on http://{}", http_addr);

    // Stops accepting on SIGINT/SIGTERM and drains in-flight requests.
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(registry.clone()))
            .configure(rest_api::configure_probes)
            .configure(rest_api::configure)
    })
    .bind(&http_addr)
    .context("Failed to bind HTTP server")?
    .shutdown_timeout(30)
    .run()
    .await
    .context("HTTP server error")?;

    info!("🛑 relation-service shutting down, closing database pool");
    pg_pool.close().await;
    Ok(())
}

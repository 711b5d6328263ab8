use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use location_recommender::config::Settings;
use location_recommender::core::Recommender;
use location_recommender::routes::{self, AppState};
use location_recommender::services::{
    CacheManager, CachedReferenceStore, ElasticsearchClient, LocationIndex, PostgresClient, ReferenceStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so the [logging] section applies
    let settings = match std::env::var("LOCREC_CONFIG") {
        Ok(path) => Settings::load_from(&path),
        Err(_) => Settings::load(),
    };

    let (default_level, default_format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "json".to_string()),
    };

    // Initialize logging; RUST_LOG wins over LOG_LEVEL, which wins over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(default_level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(default_format);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting location recommendation service...");

    let settings = settings.map_err(|e| io_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    // Reference store (PostgreSQL)
    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| io_error("Failed to connect to PostgreSQL", e))?;

    if settings.database.run_migrations {
        postgres
            .run_migrations()
            .await
            .map_err(|e| io_error("Failed to run migrations", e))?;
        info!("Reference store migrations applied");
    }

    info!(
        "PostgreSQL client initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    // Optional cache in front of the reference store
    let reference: Arc<dyn ReferenceStore> = if settings.cache.enabled {
        let ttl = settings.cache.ttl_secs.unwrap_or(300);
        let l1_size = settings.cache.l1_cache_size.unwrap_or(10_000);

        let cache = match CacheManager::new(settings.cache.redis_url.as_deref(), l1_size, ttl).await {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to connect to Redis ({}), caching in-process only", e);
                CacheManager::local(l1_size, ttl)
            }
        };

        info!("Reference cache enabled (L1: {} entries, TTL: {}s, L2: {})", l1_size, ttl, cache.stats().l2_enabled);
        Arc::new(CachedReferenceStore::new(postgres, Arc::new(cache)))
    } else {
        Arc::new(postgres)
    };

    // Location index (Elasticsearch)
    let credentials = match (&settings.elasticsearch.username, &settings.elasticsearch.password) {
        (Some(user), Some(password)) => Some((user.clone(), password.clone())),
        _ => None,
    };

    let index: Arc<dyn LocationIndex> = Arc::new(
        ElasticsearchClient::new(
            settings.elasticsearch.url.clone(),
            settings.elasticsearch.index.clone(),
            credentials,
            Duration::from_secs(settings.elasticsearch.timeout_secs.unwrap_or(10)),
        )
        .map_err(|e| io_error("Failed to create Elasticsearch client", e))?,
    );

    info!("Elasticsearch client initialized (index: {})", settings.elasticsearch.index);

    // Recommendation engine with configured weights and limits
    let model = settings.scoring.model();
    let limits = settings.recommendation.limits();
    let recommender = Recommender::new(reference.clone(), index.clone(), model, limits);

    info!(
        "Recommender initialized with model: {:?}, limits: {:?}",
        recommender.model(),
        recommender.limits()
    );

    let app_state = AppState::new(recommender, reference, index);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(routes::handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

use std::sync::Arc;

use actix_web::{middleware::Logger, web, HttpServer};
use anyhow::Context;
use log::{info, warn};

use warden_api::{
    app::create_app,
    routes::{AppState, BackendCheck},
};
use warden_core::repositories::{
    InMemoryKeyStore, InMemoryRevocationStore, InMemorySubjectDirectory, KeyStore,
    RevocationStore, SubjectResolver,
};
use warden_core::services::{
    Clock, KeySealer, SystemClock, TokenCleanupConfig, TokenCleanupService, TokenService,
    TokenServiceConfig,
};
use warden_infra::{
    DatabasePool, MySqlKeyStore, MySqlSubjectResolver, RedisClient, RedisRevocationStore,
};
use warden_shared::{AppConfig, StorageBackend};

/// Stores for the token service and the backends `/health` should check
struct Backend {
    key_store: Arc<dyn KeyStore>,
    revocations: Arc<dyn RevocationStore>,
    subjects: Arc<dyn SubjectResolver>,
    backend_checks: Vec<Arc<dyn BackendCheck>>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    env_logger::init_from_env(
        env_logger::Env::new().default_filter_or(config.environment.default_log_filter()),
    );

    info!("Starting Warden token service");

    if config.keys.ephemeral {
        warn!("KEY_ENCRYPTION_KEY not set; using an ephemeral sealing key. Persisted key pairs will not survive a restart");
    }

    let sealer = KeySealer::new(&config.keys.encryption_key)
        .context("Invalid key encryption key")?;
    let token_config = TokenServiceConfig::from_settings(&config.token, &config.keys);

    let backend = build_backend(&config, &token_config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let token_service = Arc::new(TokenService::new(
        backend.key_store,
        backend.revocations,
        backend.subjects,
        sealer,
        clock.clone(),
        token_config.clone(),
    ));

    let cleanup = Arc::new(TokenCleanupService::new(
        token_service.revocation_store(),
        token_service.key_manager(),
        clock,
        TokenCleanupConfig::from_settings(&config.cleanup, token_config.clock_tolerance),
    ));
    let _cleanup_task = cleanup.start_background_task();

    let app_state = web::Data::new(
        backend
            .backend_checks
            .into_iter()
            .fold(AppState::new(token_service), AppState::with_backend_check),
    );
    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server =
        HttpServer::new(move || create_app(app_state.clone()).wrap(Logger::default()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await?;

    Ok(())
}

/// Wire the storage backend selected by configuration
async fn build_backend(
    config: &AppConfig,
    token_config: &TokenServiceConfig,
) -> anyhow::Result<Backend> {
    match config.storage {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; keys, sessions and subjects are lost on restart");

            Ok(Backend {
                key_store: Arc::new(InMemoryKeyStore::new()),
                revocations: Arc::new(InMemoryRevocationStore::new()),
                subjects: Arc::new(InMemorySubjectDirectory::new()),
                backend_checks: Vec::new(),
            })
        }
        StorageBackend::Persistent => {
            let database = DatabasePool::new(&config.database)
                .await
                .context("Failed to connect to database")?;
            database
                .run_migrations()
                .await
                .context("Failed to run database migrations")?;
            info!("Database ready: {}", database.get_statistics());

            let redis = RedisClient::new(config.cache.clone())
                .await
                .context("Failed to connect to Redis")?;

            let pool = database.get_pool().clone();

            Ok(Backend {
                key_store: Arc::new(MySqlKeyStore::new(pool.clone())),
                revocations: Arc::new(RedisRevocationStore::new(
                    redis.clone(),
                    token_config.clock_tolerance,
                )),
                subjects: Arc::new(MySqlSubjectResolver::new(pool)),
                backend_checks: vec![Arc::new(database), Arc::new(redis)],
            })
        }
    }
}

use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::{
    cache::RedisPool,
    database::{health_check, init_pool},
};
use hub::{
    config::{AppConfig, SessionBackend},
    error::HubError,
    password::PasswordHasher,
    repositories::{MaterialRepository, MessageRepository, UserRepository},
    routes,
    session::{MemorySessionStore, RedisSessionStore, SessionStore},
    state::{AppState, Stores},
    uploads::UploadStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Study Hub");

    let config = AppConfig::from_env()?;

    // The store must be reachable before anything is served.
    let pool = match init_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Database connection failed: {}", e);
            return Err(HubError::StoreUnavailable(e.to_string()).into());
        }
    };
    if health_check(&pool).await {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    let sessions: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Redis => {
            let redis_pool = RedisPool::new(&config.redis).await?;
            if !redis_pool.health_check().await.unwrap_or(false) {
                anyhow::bail!("Failed to connect to Redis");
            }
            info!("Redis connection successful");
            Arc::new(RedisSessionStore::new(redis_pool))
        }
        SessionBackend::Memory => {
            info!("Keeping sessions in process memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    let stores = Stores {
        users: Arc::new(UserRepository::new(pool.clone())),
        messages: Arc::new(MessageRepository::new(pool.clone())),
        materials: Arc::new(MaterialRepository::new(pool.clone())),
        sessions,
    };

    let uploads = UploadStore::new(
        config.uploads.upload_dir.clone(),
        config.uploads.allowed_extensions.clone(),
    );
    let hasher = PasswordHasher::new(config.password)?;

    let state = AppState::new(
        stores,
        hasher,
        uploads,
        &config.session.secret_key,
        config.session.ttl_seconds,
        config.uploads.max_upload_bytes,
    )
    .with_db_pool(pool);

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Study Hub listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

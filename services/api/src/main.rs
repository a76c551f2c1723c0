use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::jwt::{JwtConfig, JwtService};
use api::routes;
use api::state::AppState;
use api::storage::{StorageConfig, StorageService};
use common::database::{DatabaseConfig, init_pool};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let storage = StorageService::new(StorageConfig::from_env()).await;

    let app_state = AppState::new(pool, jwt_service, storage);

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

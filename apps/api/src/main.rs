use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;

use officecube_api::agents::Orchestrator;
use officecube_api::api::{self, AppState};
use officecube_api::config::AppConfig;
use officecube_api::domain::repositories::TaskRepository;
use officecube_api::infrastructure::repositories::{
    InMemoryTaskRepository, PostgresTaskRepository,
};
use officecube_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_level);

    let orchestrator = Orchestrator::from_config(&config)?;

    let tasks: Arc<dyn TaskRepository> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;

            let repo = PostgresTaskRepository::new(pool);
            repo.ensure_schema().await?;
            tracing::info!("Database connected successfully");
            Arc::new(repo)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, tasks are kept in memory");
            Arc::new(InMemoryTaskRepository::new())
        }
    };

    let app = api::router(AppState::new(orchestrator, tasks));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

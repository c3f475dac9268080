mod db;
mod error;
mod routes;
mod state;
mod task;

use db::{create_pool, run_migrations};
use routes::create_router;
use state::{AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,taskboard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    let task_repository = task::TaskRepository::new(db.clone());
    let task_service = task::TaskService::new(task_repository);

    let state = AppState { db, task_service };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use bracketboi::{
    config::Config,
    fight::{
        load_fight_card, seed_fights, FightRepository, InMemoryFightRepository,
        PostgresFightRepository,
    },
    prediction::{InMemoryPredictionRepository, PostgresPredictionRepository, PredictionRepository},
    websockets::InMemoryConnectionManager,
    AppState,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn FightRepository + Send + Sync>,
    Arc<dyn PredictionRepository + Send + Sync>,
);

async fn repositories(config: &Config) -> Result<Repositories, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Using PostgreSQL repositories");
            Ok((
                Arc::new(PostgresFightRepository::new(pool.clone())),
                Arc::new(PostgresPredictionRepository::new(pool)),
            ))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory repositories");
            Ok((
                Arc::new(InMemoryFightRepository::new()),
                Arc::new(InMemoryPredictionRepository::new()),
            ))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bracketboi=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bracketboi prediction server");

    let config = Config::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;

    let (fight_repository, prediction_repository) = repositories(&config).await?;
    if let Some(path) = &config.fights_file {
        let fights = load_fight_card(path).await?;
        seed_fights(fight_repository.as_ref(), fights).await?;
    }
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(
        fight_repository,
        prediction_repository,
        Arc::new(InMemoryConnectionManager::new()),
        config,
    );

    let app = bracketboi::router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

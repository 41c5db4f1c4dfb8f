use std::sync::Arc;

use anyhow::Context;
use gym_coach::api::routes::create_routes;
use gym_coach::config::{run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder, GatewayConfig};
use gym_coach::services::RazorpayGateway;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(&config.log_level);

    let db_config = DatabaseConfig::from_env()?;
    let pool = db_config
        .create_pool()
        .await
        .context("failed to connect to the database")?;

    run_migrations(&pool).await.context("failed to run migrations")?;
    info!("Database migrations applied");

    if config.seed_demo_data {
        DatabaseSeeder::new(pool.clone()).seed_all().await?;
    }

    let gateway_config = GatewayConfig::from_env()?;
    if !gateway_config.is_configured() {
        warn!("PAYMENT_KEY_ID / PAYMENT_KEY_SECRET not set, payment orders will fail");
    }
    let currency = gateway_config.currency.clone();
    let gateway = Arc::new(RazorpayGateway::new(gateway_config)?);

    let app = create_routes(pool, &config, gateway, &currency);

    let address = config.server_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Gym coach server starting on http://{}", address);
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gym_coach={0},tower_http={0}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

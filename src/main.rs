use anyhow::Result;
use backoffice::config::AppConfig;
use backoffice::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("backoffice=info,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::load()?;
    if config.auth.bootstrap_admin.is_none() {
        tracing::warn!(
            "no bootstrap administrator configured, the identity provider starts without accounts"
        );
    }

    ServerBuilder::new()
        .with_config(config)
        .register_all()
        .serve()
        .await
}

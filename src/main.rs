use daily_fortune::api::{self, AppState};
use daily_fortune::config::AppConfig;
use daily_fortune::fortune::FortuneService;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.yml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = env::var("FORTUNE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_or_default(&config_path)?;
    info!("[Server] start (llm={:?}, timeout={}s)", config.llm.provider, config.llm.timeout_secs);

    let state = AppState {
        fortune: Arc::new(FortuneService::from_config(&config)),
    };
    api::start_server(&config.server, state).await
}

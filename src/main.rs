use hushbot::{bot, config::Settings};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting hushbot");

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "{} operator(s), {} reactive user(s)",
        settings.admin_user_ids.len(),
        settings.reactive_user_ids.len()
    );

    if let Err(e) = bot::runner::run(settings).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}

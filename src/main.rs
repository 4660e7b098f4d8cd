use anyhow::Result;
use tracing::info;

use airsafe::{AirSafeConfig, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AirSafeConfig::load()?;
    logging::init(&config.logging)?;

    info!("Starting AirSafe v{}", airsafe::VERSION);
    web::run(&config).await
}

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use weatherwear::{
    AdviceComposer, ChatClient, CwaClient, RecommendationService, WeatherWearConfig, logging, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = WeatherWearConfig::load()?;
    logging::init(&config.logging)?;

    info!("Starting WeatherWear {}", weatherwear::VERSION);

    let cwa = CwaClient::new(&config.cwa).context("Failed to create CWA client")?;
    let chat = ChatClient::from_config(&config.groq).context("Failed to create chat client")?;
    let composer = AdviceComposer::new(chat);
    if !composer.is_enabled() {
        warn!("GROQ_API_KEY is not set, outfit advice is disabled");
    }

    let service = Arc::new(RecommendationService::new(cwa, composer));
    web::run(&config, service).await
}

//! Quote Client Entry Point
//!
//! Runs a fixed number of quote cycles against the server and logs each one.

mod config;

use config::QuoteClientConfig;
use pow::{Authorizer, NoOpDifficulty, PowClient, RequestQuoteUseCase};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quote_client=info,pow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = QuoteClientConfig::from_env()?;

    tracing::info!(
        addr = %config.network_address,
        cycles = config.request_count,
        "Requesting quotes"
    );

    let gateway = Arc::new(PowClient::new(
        config.network_address.clone(),
        config.client.clone(),
    ));
    let authorizer = Arc::new(Authorizer::new(NoOpDifficulty, &config.pow));
    let use_case = RequestQuoteUseCase::new(gateway, authorizer);

    let mut failures = 0usize;
    for cycle in 1..=config.request_count {
        match use_case.execute().await {
            Ok(output) => {
                tracing::info!(
                    cycle,
                    mint_ms = output.mint_elapsed.as_millis() as u64,
                    token = %output.token,
                    quote = %output.quote,
                    "Received quote"
                );
            }
            Err(e) => {
                failures += 1;
                tracing::error!(cycle, error = %e, "Quote cycle failed");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} quote cycles failed", config.request_count);
    }
    Ok(())
}

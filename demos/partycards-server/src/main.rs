use partycards::prelude::*;

/// Listen address when `PARTYCARDS_ADDR` is unset.
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), PartyCardsError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::var("PARTYCARDS_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let mut builder = PartyCardsServerBuilder::new().bind(&addr);

    // A JSON file of the form {"prompts": [...], "responses": [...]}.
    if let Ok(path) = std::env::var("PARTYCARDS_CARDS") {
        let json = std::fs::read_to_string(&path)?;
        builder = builder.cards(CardPool::from_json(&json)?);
        tracing::info!(%path, "using card file");
    }

    let server = builder.build().await?;
    tracing::info!(addr = %server.local_addr()?, "partycards server listening");
    server.run().await
}

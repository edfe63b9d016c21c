//! `lumen serve` — Start the HTTP API server.

use lumen_config::AppConfig;

pub async fn run(
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(host) = host_override {
        config.gateway.host = host;
    }
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Lumen Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Corpus:    {}", config.retrieval.corpus_path.display());
    println!("   Mindmap:   {}", config.mindmap.image_path().display());

    lumen_gateway::start(config).await?;

    Ok(())
}

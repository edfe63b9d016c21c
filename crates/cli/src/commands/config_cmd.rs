//! `lumen config` — Configuration inspection commands.

use lumen_config::AppConfig;

/// Checks that pass validation but are likely to break a turn at runtime.
fn warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.has_api_key() {
        warnings.push("No API key set (set GROQ_API_KEY or LUMEN_API_KEY env var)".to_string());
    }
    if !config.retrieval.corpus_path.exists() {
        warnings.push(format!(
            "Corpus file not found: {}",
            config.retrieval.corpus_path.display()
        ));
    }
    if !config.images.dir.is_dir() {
        warnings.push(format!(
            "Page image directory not found: {}",
            config.images.dir.display()
        ));
    }
    if config.gateway.host == "0.0.0.0" {
        warnings.push("Gateway binds to all interfaces".to_string());
    }

    warnings
}

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   [ok] Config parsed and validated");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   [ok] All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   [warn] {w}");
                }
            }

            println!();
            println!("   Provider:  {}", config.default_provider);
            println!("   Model:     {}", config.default_model);
            println!("   Vision:    {}", config.vision.model);
            println!("   Embedding: {}", config.embedding.model);
            println!(
                "   Retrieval: {} lexical + {} vector, reorder {}",
                config.retrieval.lexical_top_k,
                config.retrieval.vector_top_k,
                config.retrieval.reorder
            );
            println!("   Visual:    {}", config.visual.url);
            println!(
                "   Gateway:   {}:{}",
                config.gateway.host, config.gateway.port
            );
        }
        Err(e) => {
            println!("   [error] Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let mut shown = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if shown.api_key.is_some() {
        shown.api_key = Some("[REDACTED]".into());
    }
    for provider in shown.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some("[REDACTED]".into());
        }
    }
    let toml_str = toml::to_string_pretty(&shown)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

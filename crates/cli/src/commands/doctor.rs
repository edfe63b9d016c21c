//! `lumen doctor` — Diagnose the local setup.

use lumen_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Lumen Doctor — System Diagnostics");
    println!("=================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  [warn] No config file, using defaults (run `lumen onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  [ok]   Config valid");
            config
        }
        Err(e) => {
            println!("  [fail] Config invalid: {e}");
            println!("\n  1 issue found. Fix the config before checking the rest.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  [ok]   API key configured");
    } else {
        println!("  [fail] No API key configured (set GROQ_API_KEY or add api_key to config.toml)");
        issues += 1;
    }

    let corpus = &config.retrieval.corpus_path;
    if corpus.is_file() {
        println!("  [ok]   Corpus found: {}", corpus.display());
    } else {
        println!("  [fail] Corpus missing: {}", corpus.display());
        issues += 1;
    }

    let images = &config.images.dir;
    if images.is_dir() {
        println!("  [ok]   Page images found: {}", images.display());
    } else {
        println!("  [fail] Page image directory missing: {}", images.display());
        issues += 1;
    }

    match dot_version(&config.mindmap.dot_binary).await {
        Some(version) => println!("  [ok]   Graphviz available: {version}"),
        None => {
            println!(
                "  [fail] Graphviz `{}` not runnable; mindmaps will fail",
                config.mindmap.dot_binary
            );
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// `dot -V` prints its version on stderr.
async fn dot_version(binary: &str) -> Option<String> {
    let output = tokio::process::Command::new(binary)
        .arg("-V")
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stderr);
    let line = text.lines().next().unwrap_or("").trim();
    Some(if line.is_empty() { binary.to_string() } else { line.to_string() })
}

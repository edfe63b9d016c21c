//! `lumen onboard` — First-time setup.

use std::path::Path;

use lumen_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();

    println!("Lumen — First-Time Setup");
    println!("========================\n");

    if write_default_config(&config_dir)? {
        let config_path = config_dir.join("config.toml");
        println!("[ok] Created config.toml at: {}", config_path.display());
        println!("\nNext steps:");
        println!("   1. Set GROQ_API_KEY or edit {} and add api_key", config_path.display());
        println!("   2. Point retrieval.corpus_path and images.dir at the chapter data");
        println!("   3. Run: lumen doctor, then lumen chat\n");
    } else {
        println!(
            "Config already exists at: {}",
            config_dir.join("config.toml").display()
        );
        println!("   Edit it manually or delete and re-run onboard.\n");
    }

    Ok(())
}

/// Create `dir` and write the default config into it. Returns false, and
/// leaves the file alone, when a config is already there.
fn write_default_config(dir: &Path) -> std::io::Result<bool> {
    let config_path = dir.join("config.toml");
    if config_path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(dir)?;
    std::fs::write(&config_path, AppConfig::default_toml())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_loadable_default_once() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".lumen");

        assert!(write_default_config(&config_dir).unwrap());
        let config = AppConfig::load_from(&config_dir.join("config.toml")).unwrap();
        assert_eq!(config.retrieval.lexical_top_k, 2);

        std::fs::write(config_dir.join("config.toml"), "default_model = \"kept\"\n").unwrap();
        assert!(!write_default_config(&config_dir).unwrap());
        let kept = std::fs::read_to_string(config_dir.join("config.toml")).unwrap();
        assert!(kept.contains("kept"));
    }
}

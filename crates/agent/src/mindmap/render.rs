//! Writing mindmap artifacts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lumen_config::MindmapConfig;
use lumen_core::error::{Error, Result};
use tokio::process::Command;
use tracing::{debug, info};

use super::graph::MindmapGraph;

/// Turns a mindmap graph into a viewable artifact.
#[async_trait]
pub trait MindmapRenderer: Send + Sync {
    /// Render `graph` (built from `markup`) and return the image path.
    async fn render(&self, markup: &str, graph: &MindmapGraph) -> Result<PathBuf>;

    /// Where the most recent image is, whether or not it exists yet.
    fn image_path(&self) -> PathBuf;
}

/// Writes `<stem>.xml` and `<stem>.dot`, then runs Graphviz to produce
/// `<stem>.png`. Every render overwrites the previous artifacts.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    output_dir: PathBuf,
    file_stem: String,
    dot_binary: String,
    dpi: u32,
    size: String,
}

impl GraphvizRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(&MindmapConfig {
            output_dir: output_dir.into(),
            ..MindmapConfig::default()
        })
    }

    pub fn from_config(config: &MindmapConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            file_stem: config.file_stem.clone(),
            dot_binary: config.dot_binary.clone(),
            dpi: config.dpi,
            size: config.size.clone(),
        }
    }

    pub fn with_dot_binary(mut self, dot_binary: impl Into<String>) -> Self {
        self.dot_binary = dot_binary.into();
        self
    }

    pub fn markup_path(&self) -> PathBuf {
        self.artifact("xml")
    }

    pub fn dot_path(&self) -> PathBuf {
        self.artifact("dot")
    }

    fn artifact(&self, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{extension}", self.file_stem))
    }

    async fn run_dot(&self, dot_path: &Path, image_path: &Path) -> Result<()> {
        let output = Command::new(&self.dot_binary)
            .arg("-Tpng")
            .arg("-o")
            .arg(image_path)
            .arg(dot_path)
            .output()
            .await
            .map_err(|e| Error::Render(format!("failed to run {}: {e}", self.dot_binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Render(format!(
                "{} exited with {}: {}",
                self.dot_binary,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl MindmapRenderer for GraphvizRenderer {
    async fn render(&self, markup: &str, graph: &MindmapGraph) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let markup_path = self.markup_path();
        tokio::fs::write(&markup_path, markup).await?;

        let dot_path = self.dot_path();
        tokio::fs::write(&dot_path, graph.to_dot(&self.size, self.dpi)).await?;
        debug!(dot = %dot_path.display(), nodes = graph.node_count(), "Mindmap DOT written");

        let image_path = self.image_path();
        self.run_dot(&dot_path, &image_path).await?;

        info!(image = %image_path.display(), "Mindmap rendered");
        Ok(image_path)
    }

    fn image_path(&self) -> PathBuf {
        self.artifact("png")
    }
}

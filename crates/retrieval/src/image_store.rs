//! Page image lookup.
//!
//! Page images are named `{prefix}-{NN}.jpg` with the page number zero-padded
//! to two digits.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lumen_core::error::{Error, Result};
use lumen_core::provider::ImageAttachment;

/// Directory of rendered chapter pages.
#[derive(Debug, Clone)]
pub struct PageImageStore {
    dir: PathBuf,
    prefix: String,
}

impl PageImageStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, page_num: u32) -> PathBuf {
        self.dir.join(format!("{}-{:02}.jpg", self.prefix, page_num))
    }

    /// Read a page and encode it for a vision request.
    pub async fn load(&self, page_num: u32) -> Result<ImageAttachment> {
        let path = self.path_for(page_num);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MissingArtifact { path });
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(ImageAttachment::jpeg(STANDARD.encode(bytes)))
    }
}

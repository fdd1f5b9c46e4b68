use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

/// Journal text kept on disk while it is being written, so a crash or a
/// failed save does not lose it.
pub struct Draft {
    path: PathBuf,
}

impl Draft {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Best effort: a failed write is logged and composition continues.
    pub fn save(&self, text: &str) {
        let result = self
            .path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(&self.path, text));
        if let Err(err) = result {
            warn!(path = %self.path.display(), error = %err, "failed to save journal draft");
        }
    }

    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("failed to read draft at {}", self.path.display())),
        }
    }
}

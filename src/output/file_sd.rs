//! Writes target groups as a Prometheus `file_sd` JSON file.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::discovery::TargetGroup;
use crate::error::Result;
use crate::models::render_static_configs;

#[derive(Debug, Clone)]
pub struct FileSdWriter {
    path: PathBuf,
}

impl FileSdWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `groups`, replacing the file atomically.
    ///
    /// Returns `false` without touching the file when its content is unchanged.
    pub async fn write(&self, groups: &[TargetGroup]) -> Result<bool> {
        let mut content = serde_json::to_string_pretty(&render_static_configs(groups))?;
        content.push('\n');

        match tokio::fs::read_to_string(&self.path).await {
            Ok(existing) if existing == content => {
                debug!(path = %self.path.display(), "Targets unchanged, skipping write");
                return Ok(false);
            }
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, content.as_bytes()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(true)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

use crate::{PageDriver, Result};
use std::path::PathBuf;

/// Writes page captures into a directory
#[derive(Debug, Clone)]
pub struct ScreenshotSink {
    dir: PathBuf,
}

impl ScreenshotSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `png` under `name`, creating the directory if needed
    pub fn write(&self, name: &str, png: &[u8]) -> Result<PathBuf> {
        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
        }
        let path = self.dir.join(name);
        std::fs::write(&path, png)?;
        tracing::debug!("Wrote {} bytes to {}", png.len(), path.display());
        Ok(path)
    }

    /// Best-effort capture. Errors are logged and swallowed so that they
    /// never replace the failure being diagnosed.
    pub async fn capture<D>(&self, driver: &mut D, name: &str) -> Option<PathBuf>
    where
        D: PageDriver + ?Sized,
    {
        let png = match driver.screenshot().await {
            Ok(png) => png,
            Err(e) => {
                tracing::warn!("Could not capture {}: {}", name, e);
                return None;
            }
        };

        match self.write(name, &png) {
            Ok(path) => {
                tracing::info!("Screenshot saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Could not save {}: {}", name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_missing_directory() {
        let temp = tempfile::tempdir().unwrap();
        let sink = ScreenshotSink::new(temp.path().join("shots"));

        let path = sink.write("verification_undo_success.png", b"\x89PNG").unwrap();

        assert_eq!(path, temp.path().join("shots").join("verification_undo_success.png"));
        assert_eq!(std::fs::read(path).unwrap(), b"\x89PNG");
    }
}

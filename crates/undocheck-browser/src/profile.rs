use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Chrome user data directory for one run.
///
/// A temporary profile starts logged out and is removed when dropped. A
/// persistent one keeps cookies and local storage between runs, which is
/// how an app behind a login can be verified.
#[derive(Debug)]
pub enum ProfileDir {
    Temporary(TempDir),
    Persistent(PathBuf),
}

impl ProfileDir {
    pub fn temporary() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("undocheck-profile-")
            .tempdir()?;
        Ok(ProfileDir::Temporary(dir))
    }

    /// Use `path`, creating it when missing
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }
        Ok(ProfileDir::Persistent(path))
    }

    /// Persistent profile stored as `~/.undocheck/profiles/<name>`
    pub fn named(name: &str) -> Result<Self> {
        Self::persistent(Self::named_path(name)?)
    }

    pub fn named_path(name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::Browser(format!("Invalid profile name: '{}'", name)));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Browser("Could not determine home directory".to_string()))?;
        Ok(home.join(".undocheck").join("profiles").join(name))
    }

    pub fn path(&self) -> &Path {
        match self {
            ProfileDir::Temporary(dir) => dir.path(),
            ProfileDir::Persistent(path) => path,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, ProfileDir::Temporary(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_profile_creates_and_cleans_up() {
        let profile = ProfileDir::temporary().unwrap();
        let path = profile.path().to_path_buf();

        assert!(profile.is_temporary());
        assert!(path.is_dir());

        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn test_persistent_profile_survives_drop() {
        let temp = tempfile::tempdir().unwrap();
        let profile_path = temp.path().join("journal-login");

        let profile = ProfileDir::persistent(profile_path.clone()).unwrap();
        assert!(!profile.is_temporary());
        assert!(profile_path.is_dir());

        drop(profile);
        assert!(profile_path.exists());
    }

    #[test]
    fn test_named_profile_rejects_path_traversal() {
        assert!(ProfileDir::named_path("../escape").is_err());
        assert!(ProfileDir::named_path("").is_err());
        assert!(ProfileDir::named_path("..").is_err());
    }

    #[test]
    fn test_named_profile_lives_under_home() {
        if let Ok(path) = ProfileDir::named_path("work") {
            assert!(path.ends_with(".undocheck/profiles/work"));
        }
    }
}

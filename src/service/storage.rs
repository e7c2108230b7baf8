use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::database::db::AppError;

/// Where uploaded documents end up. Paths handed out are relative to the
/// storage root and use `/` separators.
pub trait FileStorage: Send + Sync {
    fn store(&self, directory: &str, extension: &str, bytes: &[u8]) -> Result<String, AppError>;

    /// Removes a stored file. Deleting a file that is already gone is not an error.
    fn delete(&self, path: &str) -> Result<(), AppError>;

    fn exists(&self, path: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStorage { root: root.into() }
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || relative.as_os_str().is_empty() {
            return Err(AppError::StorageError(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("refusing storage path {}", relative.display()),
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStorage for LocalStorage {
    fn store(&self, directory: &str, extension: &str, bytes: &[u8]) -> Result<String, AppError> {
        let relative = format!("{}/{}.{}", directory, Uuid::new_v4().simple(), extension);
        let target = self.resolve(&relative)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;

        log::debug!("Stored {} bytes at {}", bytes.len(), target.display());
        Ok(relative)
    }

    fn delete(&self, path: &str) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageError(e)),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_under_directory_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let path = storage.store("documents", "png", b"\x89PNG").unwrap();
        assert!(path.starts_with("documents/"));
        assert!(path.ends_with(".png"));
        assert!(storage.exists(&path));
        assert_eq!(fs::read(dir.path().join(&path)).unwrap(), b"\x89PNG");

        storage.delete(&path).unwrap();
        assert!(!storage.exists(&path));
        storage.delete(&path).unwrap();
    }

    #[test]
    fn rejects_paths_outside_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        assert!(storage.delete("../etc/passwd").is_err());
        assert!(storage.delete("/etc/passwd").is_err());
        assert!(!storage.exists("../outside"));
    }
}

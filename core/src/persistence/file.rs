// campus-eats/src/persistence/file.rs

use super::{KeyValueStore, PersistenceError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Device-local storage: one `<key>.json` file per key under a private directory.
///
/// On unix the directory is created `0700` and each file is written `0600`.
#[derive(Debug, Clone)]
pub struct FileStore {
  root: PathBuf,
}

impl FileStore {
  /// Creates the data directory if needed.
  pub async fn open(root: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
    let root = root.into();
    tokio::fs::create_dir_all(&root)
      .await
      .map_err(|source| PersistenceError::Io {
        path: root.clone(),
        source,
      })?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      if let Err(e) = tokio::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o700)).await {
        warn!(path = %root.display(), error = %e, "Failed to restrict data directory permissions.");
      }
    }

    debug!(path = %root.display(), "File store opened.");
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
    let valid = !key.is_empty()
      && key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
      return Err(PersistenceError::Backend(format!("Invalid storage key '{}'", key)));
    }
    Ok(self.root.join(format!("{}.json", key)))
  }
}

#[async_trait]
impl KeyValueStore for FileStore {
  async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
    let path = self.path_for(key)?;
    match tokio::fs::read_to_string(&path).await {
      Ok(contents) => Ok(Some(contents)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(source) => Err(PersistenceError::Io { path, source }),
    }
  }

  async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
    let path = self.path_for(key)?;
    // Readers only ever see a complete record: write aside, then rename over.
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, value)
      .await
      .map_err(|source| PersistenceError::Io {
        path: tmp_path.clone(),
        source,
      })?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      tokio::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))
        .await
        .map_err(|source| PersistenceError::Io {
          path: tmp_path.clone(),
          source,
        })?;
    }

    tokio::fs::rename(&tmp_path, &path)
      .await
      .map_err(|source| PersistenceError::Io { path, source })
  }

  async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
    let path = self.path_for(key)?;
    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(source) => Err(PersistenceError::Io { path, source }),
    }
  }

  fn backend_name(&self) -> &'static str {
    "file"
  }
}

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Filesystem mirror of uploaded pictures.
///
/// The database row is authoritative; implementations only hold a derived copy.
#[async_trait]
pub trait PictureStore: Send + Sync {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<()>;
    async fn remove(&self, filename: &str) -> Result<()>;
    async fn exists(&self, filename: &str) -> Result<bool>;
}

pub struct LocalPictureStore {
    root: PathBuf,
}

impl LocalPictureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filenames are sanitized upstream; anything still carrying a path
    /// component is refused here rather than joined.
    fn path_for(&self, filename: &str) -> Result<PathBuf> {
        let name = Path::new(filename);
        if name.file_name().and_then(|n| n.to_str()) != Some(filename) {
            anyhow::bail!("refusing to store picture under '{}'", filename);
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl PictureStore for LocalPictureStore {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(filename)?;
        tokio::fs::write(&path, data).await?;
        tracing::debug!("Mirrored picture to {}", path.display());
        Ok(())
    }

    async fn remove(&self, filename: &str) -> Result<()> {
        let path = self.path_for(filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, filename: &str) -> Result<bool> {
        let path = self.path_for(filename)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

/// Used when mirroring is disabled.
pub struct NoOpPictureStore;

#[async_trait]
impl PictureStore for NoOpPictureStore {
    async fn save(&self, _filename: &str, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _filename: &str) -> Result<()> {
        Ok(())
    }

    async fn exists(&self, _filename: &str) -> Result<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPictureStore::new(dir.path());

        store.save("cat.png", b"meow").await.unwrap();
        assert!(store.exists("cat.png").await.unwrap());
        assert_eq!(
            tokio::fs::read(dir.path().join("cat.png")).await.unwrap(),
            b"meow"
        );

        store.remove("cat.png").await.unwrap();
        assert!(!store.exists("cat.png").await.unwrap());

        // Removing twice is fine
        store.remove("cat.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPictureStore::new(dir.path());

        assert!(store.save("../escape.png", b"x").await.is_err());
        assert!(store.save("nested/cat.png", b"x").await.is_err());
        assert!(store.save("", b"x").await.is_err());
    }

    #[tokio::test]
    async fn test_noop_store_keeps_nothing() {
        let store = NoOpPictureStore;
        store.save("cat.png", b"meow").await.unwrap();
        assert!(!store.exists("cat.png").await.unwrap());
    }
}

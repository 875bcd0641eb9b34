use crate::cache::{ArtifactError, ArtifactRef, ArtifactResult, ArtifactStore, CacheKey};
use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Stores each result as a JSON array in `<directory>/<digest>.json`.
pub struct FileArtifactStore {
    directory: PathBuf,
}

impl FileArtifactStore {
    pub fn new(directory: Option<String>) -> Self {
        let directory = directory.unwrap_or("asset".to_string());
        Self {
            directory: PathBuf::from(Path::new(&directory)),
        }
    }

    pub fn artifact_path(&self, key: &CacheKey) -> PathBuf {
        self.directory.join(format!("{}.json", key.digest_name()))
    }

    async fn open_for_write(&self, path: &Path) -> ArtifactResult<fs::File> {
        let created = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await;
        match created {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Artifact already exists, reopening: {:?}", path);
                Ok(fs::OpenOptions::new().write(true).open(path).await?)
            }
            Err(e) => Err(ArtifactError::IO(e)),
        }
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn write(&self, key: &CacheKey, findings: &[String]) -> ArtifactResult<ArtifactRef> {
        let path = self.artifact_path(key);
        if let Some(folder) = path.parent() {
            fs::create_dir_all(folder).await?;
        }

        let bytes = serde_json::to_vec(findings)?;
        let mut file = self.open_for_write(&path).await?;
        file.write_all(&bytes).await?;
        // A reopened artifact may hold a longer previous result.
        file.set_len(bytes.len() as u64).await?;
        file.flush().await?;

        debug!("Wrote artifact {:?} ({} findings)", path, findings.len());
        Ok(ArtifactRef(path.to_string_lossy().to_string()))
    }

    async fn read(&self, artifact: &ArtifactRef) -> ArtifactResult<Vec<String>> {
        let bytes = fs::read(&artifact.0).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

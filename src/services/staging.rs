use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Hands out uniquely named scratch files for in-flight uploads.
///
/// Each request stages to its own file, so concurrent requests can never
/// collide. Nothing here outlives the request that created it.
#[derive(Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Write the inbound byte stream to a fresh file under the staging
    /// directory and return the handle that owns it.
    pub async fn stage<R>(&self, mut reader: R) -> io::Result<StagedFile>
    where
        R: AsyncRead + Unpin,
    {
        let temp = NamedTempFile::new_in(&self.dir)?;
        let mut file = tokio::fs::File::create(temp.path()).await?;
        let bytes = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;

        tracing::debug!(bytes, "Staged upload at {}", temp.path().display());

        Ok(StagedFile { temp, bytes })
    }
}

/// A request-scoped temporary copy of the uploaded bytes.
///
/// `release` consumes the handle, so the file can only be removed once.
/// If a handle is dropped without an explicit release (client disconnect,
/// early error propagation) the underlying temp file is still removed.
pub struct StagedFile {
    temp: NamedTempFile,
    bytes: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes
    }

    /// Delete the staged bytes. A failed removal is logged and swallowed:
    /// the response for this request has already been decided by the time
    /// cleanup runs, and must not change because of it.
    pub fn release(self) {
        let path = self.temp.path().to_path_buf();
        if let Err(e) = self.temp.close() {
            tracing::error!("Failed to remove staged file {}: {}", path.display(), e);
        }
    }
}

//! Blob directory storage.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};

use crate::{DriveError, Result};

/// Prefix of every blob file name.
pub const BLOB_PREFIX: &str = "c";

/// Flat directory of immutable content blobs.
///
/// ```text
/// {base_path}/
/// ├── c4fHk2a
/// ├── cX9pLm0
/// └── ...
/// ```
///
/// Blob names come from the platform temp-file mechanism, which creates the
/// file exclusively and so never hands out a name already present.
#[derive(Debug, Clone)]
pub struct ContentStore {
    base_path: PathBuf,
}

impl ContentStore {
    /// Create a content store rooted at `base_path`.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Stream `data` into a new blob.
    ///
    /// Returns the blob id and the number of bytes written. If reading or
    /// writing fails midway the partial blob is deleted; existing blobs are
    /// never opened for writing.
    pub async fn write<R>(&self, data: &mut R) -> Result<(String, u64)>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let temp = tempfile::Builder::new()
            .prefix(BLOB_PREFIX)
            .tempfile_in(&self.base_path)?;
        let mut file = File::from_std(temp.as_file().try_clone()?);

        // Dropping `temp` on any error below removes the partial file.
        let size = tokio::io::copy(data, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        let (_, path) = temp.keep().map_err(|e| DriveError::Content(e.error))?;
        let blob_id = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                DriveError::Content(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("blob path {} has no UTF-8 name", path.display()),
                ))
            })?;

        debug!("Stored blob {} ({} bytes)", blob_id, size);
        Ok((blob_id, size))
    }

    /// Open a blob for reading.
    ///
    /// The returned file is seekable. Fails with `NotFound` if the blob is
    /// missing.
    pub async fn read(&self, blob_id: &str) -> Result<File> {
        let path = self.blob_path(blob_id)?;

        match File::open(&path).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Blob {} referenced but missing", blob_id);
                Err(DriveError::NotFound(format!("blob {blob_id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Full filesystem path of a blob.
    ///
    /// Rejects ids that could escape the blob directory.
    pub fn blob_path(&self, blob_id: &str) -> Result<PathBuf> {
        if blob_id.is_empty()
            || blob_id == "."
            || blob_id == ".."
            || blob_id.contains(['/', '\\'])
        {
            return Err(DriveError::Validation(format!("invalid blob id '{blob_id}'")));
        }

        Ok(self.base_path.join(blob_id))
    }
}

//! Atomic artifact writer
//!
//! Streams a download into `<target>.tmp` and renames it over `target` only
//! after the stream is drained and the file is flushed and closed. On any
//! failure the temporary file is removed, so `target` never holds a partial
//! video.

use futures::{Stream, StreamExt};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::pin::pin;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cancellable;
use crate::error::{ClientError, Result};

/// Sibling temporary path used while downloading to `target`
pub fn temp_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `stream` to `target` atomically
///
/// # Returns
/// Number of bytes written
pub async fn write_atomically<S, B>(
    stream: S,
    target: &Path,
    cancel: &CancellationToken,
) -> Result<u64>
where
    S: Stream<Item = Result<B>>,
    B: AsRef<[u8]>,
{
    let tmp = temp_path(target);
    let file = File::create(&tmp)
        .await
        .map_err(|e| ClientError::io("create", &tmp, e))?;

    let written = match drain_into(stream, file, &tmp, cancel).await {
        Ok(written) => written,
        Err(e) => {
            discard(&tmp).await;
            return Err(e);
        }
    };

    if let Err(e) = fs::rename(&tmp, target).await {
        discard(&tmp).await;
        return Err(ClientError::io("rename", target, e));
    }

    debug!("Published {} ({} bytes)", target.display(), written);
    Ok(written)
}

/// Copy every chunk into `file`, then flush, sync and close it
async fn drain_into<S, B>(
    stream: S,
    mut file: File,
    tmp: &Path,
    cancel: &CancellationToken,
) -> Result<u64>
where
    S: Stream<Item = Result<B>>,
    B: AsRef<[u8]>,
{
    let mut stream = pin!(stream);
    let mut written = 0u64;

    while let Some(chunk) = cancellable(cancel, async { stream.next().await.transpose() }).await? {
        let bytes = chunk.as_ref();
        file.write_all(bytes)
            .await
            .map_err(|e| ClientError::io("write", tmp, e))?;
        written += bytes.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| ClientError::io("flush", tmp, e))?;
    file.sync_all()
        .await
        .map_err(|e| ClientError::io("close", tmp, e))?;
    drop(file);

    Ok(written)
}

async fn discard(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove temporary file {}: {}", tmp.display(), e);
        }
    }
}

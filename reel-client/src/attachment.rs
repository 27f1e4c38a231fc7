//! Reference attachment classification
//!
//! A reference file is read twice: once to sniff its leading bytes, once in
//! full for the upload. Sources therefore have to be seekable, which is what
//! [`AttachmentSource`] asks for.

use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, SeekFrom};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Canonical content types the service accepts as a reference
pub const SUPPORTED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "video/mp4"];

/// Number of leading bytes inspected for magic numbers
const SNIFF_LEN: usize = 512;

/// A readable byte source that can be rewound to its start
pub trait AttachmentSource: AsyncRead + AsyncSeek + Unpin + Send + Sync {}

impl<T: AsyncRead + AsyncSeek + Unpin + Send + Sync> AttachmentSource for T {}

/// Map a MIME type (possibly with parameters) onto its canonical form
///
/// Returns `None` for anything the service does not accept.
pub fn canonicalize(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("image/jpeg"),
        "image/png" | "image/x-png" => Some("image/png"),
        "image/webp" => Some("image/webp"),
        "video/mp4" => Some("video/mp4"),
        _ => None,
    }
}

/// Determine the canonical content type of `source`
///
/// Sniffs up to 512 leading bytes first and falls back to the extension of
/// `name`. The source is rewound to offset 0 before returning, on success
/// and on unsupported types alike.
pub async fn classify<S>(source: &mut S, name: &Path) -> Result<&'static str>
where
    S: AttachmentSource + ?Sized,
{
    let mut header = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        let n = source
            .read(&mut header[filled..])
            .await
            .map_err(|e| ClientError::io("read reference header", name, e))?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    source
        .seek(SeekFrom::Start(0))
        .await
        .map_err(|e| ClientError::io("rewind reference", name, e))?;

    if let Some(kind) = infer::get(&header[..filled]) {
        if let Some(canonical) = canonicalize(kind.mime_type()) {
            debug!("Sniffed {} as {}", name.display(), canonical);
            return Ok(canonical);
        }
    }

    let by_extension = name
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| mime_guess::from_ext(&ext.to_ascii_lowercase()).first_raw())
        .and_then(canonicalize);

    match by_extension {
        Some(canonical) => {
            debug!("Classified {} as {} by extension", name.display(), canonical);
            Ok(canonical)
        }
        None => Err(ClientError::UnsupportedAttachmentType {
            supported: SUPPORTED_TYPES.iter().map(|t| t.to_string()).collect(),
        }),
    }
}

/// A classified reference file ready for upload
#[derive(Debug)]
pub struct Attachment<S = tokio::fs::File> {
    source: S,
    path: PathBuf,
    file_name: String,
    content_type: &'static str,
    len: u64,
}

impl Attachment<tokio::fs::File> {
    /// Open and classify a local reference file
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| ClientError::io("open reference", path, e))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| ClientError::io("stat reference", path, e))?;
        if !metadata.is_file() {
            return Err(ClientError::InvalidRequest(format!(
                "reference {} is not a regular file",
                path.display()
            )));
        }

        Self::from_source(file, path, metadata.len()).await
    }
}

impl<S: AttachmentSource> Attachment<S> {
    /// Classify an already opened source
    ///
    /// `path` supplies the upload file name and the extension fallback;
    /// `len` is the total byte length of the source.
    pub async fn from_source(mut source: S, path: impl Into<PathBuf>, len: u64) -> Result<Self> {
        let path = path.into();
        let content_type = classify(&mut source, &path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reference".to_string());

        Ok(Self {
            source,
            path,
            file_name,
            content_type,
            len,
        })
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Base name sent as the multipart file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rewind to offset 0 and hand out the source for a full read
    pub async fn into_rewound_source(mut self) -> Result<S> {
        self.source
            .seek(SeekFrom::Start(0))
            .await
            .map_err(|e| ClientError::io("rewind reference", &self.path, e))?;
        Ok(self.source)
    }
}

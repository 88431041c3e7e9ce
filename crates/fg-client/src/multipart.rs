//! `multipart/form-data` encoding for resource input files

use crate::Result;
use bytes::Bytes;
use std::path::Path;
use tokio::io::AsyncRead;
use tracing::debug;

/// Form field every uploaded file is sent under
pub const FILE_FIELD: &str = "file[]";

const CRLF: &[u8] = b"\r\n";

/// A named file to upload, read exactly once
pub struct FilePart {
    name: String,
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl FilePart {
    /// Wrap any async byte source
    pub fn new(name: impl Into<String>, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    /// File held in memory
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::new(name, std::io::Cursor::new(data.into()))
    }

    /// Open a file on disk; the part is named after the file
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} does not name a file", path.display()),
                )
            })?;
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::new(name, file))
    }

    /// File name sent in the part's `Content-Disposition`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type guessed from the file name
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .to_string()
    }
}

impl std::fmt::Debug for FilePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePart").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A multipart body under construction, identified by its boundary
#[derive(Clone, Debug)]
pub struct MultipartBody {
    boundary: String,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    /// New body with a fresh random boundary
    pub fn new() -> Self {
        Self {
            boundary: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    /// Body with a caller-chosen boundary
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value of the request's `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encode every file, in order, into a single body.
    ///
    /// Each source is read to its end and dropped before the next one is
    /// touched. A read failure aborts the whole encoding.
    pub async fn encode(&self, files: Vec<FilePart>) -> Result<Bytes> {
        let mut out: Vec<u8> = Vec::new();

        for part in files {
            let content_type = part.content_type();
            let FilePart { name, mut reader } = part;

            out.extend_from_slice(b"--");
            out.extend_from_slice(self.boundary.as_bytes());
            out.extend_from_slice(CRLF);
            out.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                    FILE_FIELD,
                    escape_filename(&name)
                )
                .as_bytes(),
            );
            out.extend_from_slice(CRLF);
            out.extend_from_slice(format!("Content-Type: {}", content_type).as_bytes());
            out.extend_from_slice(CRLF);
            out.extend_from_slice(b"Content-Transfer-Encoding: binary");
            out.extend_from_slice(CRLF);
            out.extend_from_slice(CRLF);

            let copied = tokio::io::copy(&mut reader, &mut out).await?;
            drop(reader);
            debug!(file = %name, bytes = copied, "Encoded multipart file");

            out.extend_from_slice(CRLF);
        }

        out.extend_from_slice(b"--");
        out.extend_from_slice(self.boundary.as_bytes());
        out.extend_from_slice(b"--");
        out.extend_from_slice(CRLF);

        Ok(Bytes::from(out))
    }
}

/// Quote-safe file name for a `Content-Disposition` parameter
fn escape_filename(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

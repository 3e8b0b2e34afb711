use std::fmt;
use std::pin::Pin;
use tokio::io::AsyncRead;

pub const DEFAULT_MIME: &str = "application/octet-stream";

/// An uploaded file stream waiting to be written by the store.
pub struct FilePayload<'a> {
    pub name: String,
    pub mime: String,
    pub content: Pin<Box<dyn AsyncRead + Send + 'a>>,
}

impl<'a> FilePayload<'a> {
    pub fn new<R>(name: impl Into<String>, mime: impl Into<String>, content: R) -> Self
    where
        R: AsyncRead + Send + 'a,
    {
        Self {
            name: name.into(),
            mime: mime.into(),
            content: Box::pin(content),
        }
    }
}

impl fmt::Debug for FilePayload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePayload")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .finish_non_exhaustive()
    }
}

pub struct MimeDetector;

impl MimeDetector {
    /// Number of leading bytes worth sniffing.
    pub const HEAD_LEN: usize = 8192;

    /// Uses the uploader's MIME type when there is one, otherwise sniffs the
    /// magic bytes at the start of the file.
    pub fn resolve(declared: &str, head: &[u8]) -> String {
        let declared = declared.trim();
        if !declared.is_empty() {
            return declared.to_string();
        }

        match infer::get(head) {
            Some(kind) => kind.mime_type().to_string(),
            None => DEFAULT_MIME.to_string(),
        }
    }
}
